//! Response assembly: headers, records and list pages.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::Result;
use crate::config::{PagingMode, ProviderConfig};
use crate::generators::{DublinCoreGenerator, LinkedPayloadGenerator};
use crate::response::ListPage;
use crate::token::ResumptionToken;
use crate::traits::{FormatGenerator, GenerateContext, Repository};
use crate::types::{BaseUrl, Header, MetadataFormat, Record, Resource, normalize_path};

/// Generator lookup: per-prefix overrides, then Dublin Core for `oai_dc`
/// and linked payloads for everything else.
#[derive(Clone)]
pub struct Generators {
    dublin_core: Arc<dyn FormatGenerator>,
    linked: Arc<dyn FormatGenerator>,
    overrides: HashMap<String, Arc<dyn FormatGenerator>>,
}

impl Generators {
    /// Use `generator` for the given prefix instead of the built-ins.
    pub fn insert(&mut self, prefix: impl Into<String>, generator: Arc<dyn FormatGenerator>) {
        self.overrides.insert(prefix.into(), generator);
    }

    pub fn for_format(&self, format: &MetadataFormat) -> &dyn FormatGenerator {
        if let Some(generator) = self.overrides.get(&format.prefix) {
            return generator.as_ref();
        }
        if format.is_default() {
            self.dublin_core.as_ref()
        } else {
            self.linked.as_ref()
        }
    }
}

impl Default for Generators {
    fn default() -> Self {
        Self {
            dublin_core: Arc::new(DublinCoreGenerator),
            linked: Arc::new(LinkedPayloadGenerator),
            overrides: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Generators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generators")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builds protocol structures from repository resources for one request.
pub struct Assembler<'a> {
    pub repository: &'a dyn Repository,
    pub config: &'a ProviderConfig,
    pub generators: &'a Generators,
    pub base: &'a BaseUrl,
}

impl Assembler<'_> {
    /// Build the header: URI, datestamp and resolved set specs.
    pub async fn header(&self, resource: &Resource) -> Result<Header> {
        let props = &self.config.properties;
        let mut set_specs = Vec::new();

        for id in resource.property_values(&props.is_part_of_set) {
            let set_path = normalize_path(&format!("{}/{}", self.config.sets_root_path, id));
            let spec = self
                .repository
                .resource(&set_path)
                .await?
                .and_then(|set| set.property(&props.has_set_spec).map(String::from));

            match spec {
                Some(spec) => set_specs.push(spec),
                None => warn!(
                    path = %resource.path,
                    set = %id,
                    "Resource references a set without spec"
                ),
            }
        }

        Ok(Header {
            identifier: self.base.path_to_uri(&resource.path),
            datestamp: resource.last_modified,
            set_specs,
        })
    }

    /// Build a full record in the given format.
    pub async fn record(&self, resource: &Resource, format: &MetadataFormat) -> Result<Record> {
        let header = self.header(resource).await?;
        let ctx = GenerateContext {
            repository: self.repository,
            base: self.base,
            properties: &self.config.properties,
        };
        let metadata = self
            .generators
            .for_format(format)
            .generate(resource, format, &ctx)
            .await?;

        if metadata.is_none() {
            debug!(path = %resource.path, prefix = %format.prefix, "Record without metadata");
        }

        Ok(Record { header, metadata })
    }
}

/// Cut a page out of query rows and attach the continuation.
///
/// In [`PagingMode::FullPage`] a token is attached iff exactly `page_size`
/// items came back. In [`PagingMode::Lookahead`] the rows may hold one extra
/// item, which is dropped and signals the continuation.
pub fn assemble_list_page<T>(
    mut items: Vec<T>,
    query: &ResumptionToken,
    page_size: u64,
    paging: PagingMode,
) -> ListPage<T> {
    let page_size_usize = usize::try_from(page_size).unwrap_or(usize::MAX);
    let has_more = match paging {
        PagingMode::FullPage => items.len() == page_size_usize,
        PagingMode::Lookahead => {
            let more = items.len() > page_size_usize;
            items.truncate(page_size_usize);
            more
        }
    };

    ListPage {
        items,
        resumption_token: has_more.then(|| query.next_page(page_size).encode()),
        cursor: query.offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryRepository;
    use crate::token;
    use crate::types::{SetDescriptor, Verb};

    fn query(offset: u64) -> ResumptionToken {
        ResumptionToken {
            verb: Verb::ListIdentifiers,
            metadata_prefix: "oai_dc".to_string(),
            from: None,
            until: None,
            set: Some("s".to_string()),
            offset,
        }
    }

    #[test]
    fn full_page_gets_token_with_advanced_offset() {
        let page = assemble_list_page(vec![1, 2, 3], &query(6), 3, PagingMode::FullPage);
        let next = token::decode(page.resumption_token.as_deref().unwrap()).unwrap();
        assert_eq!(next.offset, 9);
        assert_eq!(next.set.as_deref(), Some("s"));
        assert_eq!(page.cursor, 6);
    }

    #[test]
    fn short_page_has_no_token() {
        let page = assemble_list_page(vec![1, 2], &query(0), 3, PagingMode::FullPage);
        assert!(page.resumption_token.is_none());
    }

    #[test]
    fn lookahead_trims_extra_row() {
        let page = assemble_list_page(vec![1, 2, 3, 4], &query(0), 3, PagingMode::Lookahead);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(page.resumption_token.is_some());

        let exact = assemble_list_page(vec![1, 2, 3], &query(0), 3, PagingMode::Lookahead);
        assert!(exact.resumption_token.is_none());
    }

    #[tokio::test]
    async fn header_resolves_set_specs() {
        let config = ProviderConfig::default();
        let props = &config.properties;
        let repo = MemoryRepository::new();
        repo.insert(
            Resource::new("oai/sets/child", "oai:set")
                .with_property(props.has_set_spec.clone(), "parent:child"),
        );
        let set = SetDescriptor::new("parent:child", "Child");

        let resource = Resource::new("objects/a", "fedora:object")
            .with_property(props.is_part_of_set.clone(), set.id())
            .with_property(props.is_part_of_set.clone(), "ghost");

        let base = BaseUrl::new("http://localhost/rest").unwrap();
        let generators = Generators::default();
        let assembler = Assembler {
            repository: &repo,
            config: &config,
            generators: &generators,
            base: &base,
        };

        let header = assembler.header(&resource).await.unwrap();
        assert_eq!(header.identifier, "http://localhost/rest/objects/a");
        assert_eq!(header.set_specs, vec!["parent:child".to_string()]);
        assert_eq!(header.datestamp, resource.last_modified);
    }

    #[tokio::test]
    async fn record_for_linked_format_without_payload_has_no_metadata() {
        let config = ProviderConfig::default();
        let repo = MemoryRepository::new();
        let base = BaseUrl::new("http://localhost/rest").unwrap();
        let generators = Generators::default();
        let assembler = Assembler {
            repository: &repo,
            config: &config,
            generators: &generators,
            base: &base,
        };
        let format = MetadataFormat {
            prefix: "marc21".to_string(),
            schema_url: "s".to_string(),
            namespace: "n".to_string(),
            selector_property: Some("urn:hasMarc".to_string()),
        };

        let resource = Resource::new("objects/a", "fedora:object");
        let record = assembler.record(&resource, &format).await.unwrap();
        assert_eq!(record.metadata, None);

        let dc = assembler
            .record(&resource, &MetadataFormat::oai_dc())
            .await
            .unwrap();
        assert!(dc.metadata.unwrap().contains("<oai_dc:dc"));
    }
}
