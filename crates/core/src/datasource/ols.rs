//! Ontology Lookup Service (OLS) registry client.
//!
//! Walks the paged `GET /api/ontologies` collection and turns every
//! ontology's `config` block into a [`DatasourceRecord`].

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{DatasourceRecord, DatasourceTable, SOURCE_TYPE_ONTOLOGY};
use crate::errors::RegistryError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OntologyPage {
    #[serde(rename = "_embedded", default)]
    embedded: Option<EmbeddedOntologies>,
    #[serde(rename = "_links", default)]
    links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedOntologies {
    #[serde(default)]
    ontologies: Vec<OntologyEntry>,
}

#[derive(Debug, Deserialize)]
struct OntologyEntry {
    #[serde(default)]
    config: Option<OntologyConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OntologyConfig {
    id: Option<String>,
    preferred_prefix: Option<String>,
    title: Option<String>,
    description: Option<String>,
    version: Option<String>,
    base_uris: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PageLinks {
    next: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

impl OntologyConfig {
    fn into_record(self) -> Option<DatasourceRecord> {
        let prefix = self.preferred_prefix.clone().or_else(|| self.id.clone())?;

        let mut alternative_prefixes = Vec::new();
        if let Some(id) = &self.id {
            alternative_prefixes.push(id.clone());
        }
        if let Some(preferred) = &self.preferred_prefix {
            if self.id.as_deref() != Some(preferred.as_str()) {
                alternative_prefixes.push(preferred.clone());
            }
        }

        let base_uri = self
            .base_uris
            .and_then(|uris| uris.into_iter().next())
            .unwrap_or_default();

        Some(DatasourceRecord {
            prefix: prefix.to_uppercase(),
            idorg_namespace: String::new(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            source_type: SOURCE_TYPE_ONTOLOGY.to_string(),
            base_uri,
            alternative_prefixes,
            license: String::new(),
            version_info: self.version.unwrap_or_default(),
        })
    }
}

/// Parse one page of the ontologies collection.
///
/// Returns the records found on the page and the URL of the next page.
pub fn parse_ontologies_page(
    body: &str,
) -> Result<(Vec<DatasourceRecord>, Option<String>), RegistryError> {
    let page: OntologyPage =
        serde_json::from_str(body).map_err(|e| RegistryError::Parse(e.to_string()))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for entry in page.embedded.map(|e| e.ontologies).unwrap_or_default() {
        match entry.config.and_then(OntologyConfig::into_record) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "skipped ontologies without a usable config");
    }

    let next = page.links.and_then(|l| l.next).map(|l| l.href);
    Ok((records, next))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Asynchronous OLS client.
#[derive(Clone)]
pub struct OlsClient {
    http: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl OlsClient {
    pub fn new(
        base_url: impl Into<String>,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("sssom2neo/0.1"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        info!(base_url = %base_url, "created OlsClient");
        Ok(Self {
            http,
            base_url,
            page_size,
        })
    }

    /// Fetch every ontology the registry lists.
    ///
    /// A non-success status stops paging and keeps what was collected so
    /// far, as does a `next` link pointing back at an already fetched page.
    /// Transport failures are returned as errors.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_catalog(&self) -> Result<DatasourceTable, RegistryError> {
        let mut table = DatasourceTable::new();
        let mut next = Some(format!(
            "{}/api/ontologies?size={}",
            self.base_url, self.page_size
        ));
        let mut pages = 0u32;
        let mut fetched = HashSet::new();

        while let Some(url) = next.take() {
            if !fetched.insert(url.clone()) {
                warn!(%url, "registry pagination revisits a fetched page; stopping");
                break;
            }
            let resp = self.http.get(&url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                warn!(%url, status = status.as_u16(), "registry returned an error status; stopping");
                break;
            }

            let body = resp.text().await?;
            let (records, next_url) = parse_ontologies_page(&body)?;
            pages += 1;
            debug!(page = pages, count = records.len(), "fetched ontology page");
            for record in records {
                table.insert(record);
            }
            next = next_url;
        }

        info!(pages, count = table.len(), "fetched datasource catalog");
        Ok(table)
    }
}
