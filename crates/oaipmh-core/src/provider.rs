//! The OAI-PMH verb dispatcher.
//!
//! [`OaiProvider`] takes one [`OaiRequest`] at a time and produces exactly
//! one [`OaiResponse`]. A resumption token is decoded before anything else
//! and supersedes every other argument. Protocol failures become an error
//! body; only repository failures escape as `Err`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::assemble::{Assembler, Generators, assemble_list_page};
use crate::config::{PagingMode, ProviderConfig};
use crate::error::{Error, InvalidInputError, OaiError};
use crate::planner::ListPlanner;
use crate::registry::FormatRegistry;
use crate::request::OaiRequest;
use crate::response::{
    GRANULARITY, Identify, ListPage, OaiResponse, PROTOCOL_VERSION, RequestEcho, ResponseBody,
};
use crate::token::{self, ResumptionToken};
use crate::traits::{FormatGenerator, Repository};
use crate::types::{
    BaseUrl, Header, MetadataFormat, Property, Record, Resource, SetDescriptor, Verb,
    normalize_path, set_id,
};
use crate::validate::{Command, validate};

/// Per-request addressing.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Base for resource identifiers.
    pub base: BaseUrl,
    /// The OAI endpoint URL, echoed in `<request>` and Identify.
    pub endpoint: String,
}

impl RequestContext {
    pub fn new(base: BaseUrl, endpoint: impl Into<String>) -> Self {
        Self {
            base,
            endpoint: endpoint.into(),
        }
    }
}

/// An OAI-PMH data provider over a [`Repository`].
pub struct OaiProvider<R> {
    repository: R,
    config: ProviderConfig,
    registry: FormatRegistry,
    planner: ListPlanner,
    generators: Generators,
}

impl<R: Repository> OaiProvider<R> {
    /// Create a provider, validating the configuration.
    pub fn new(repository: R, config: ProviderConfig) -> Result<Self> {
        config.check()?;
        let registry = config.registry()?;
        let planner = ListPlanner::new(&config);

        Ok(Self {
            repository,
            config,
            registry,
            planner,
            generators: Generators::default(),
        })
    }

    /// Override the metadata generator for a prefix.
    pub fn with_generator(
        mut self,
        prefix: impl Into<String>,
        generator: Arc<dyn FormatGenerator>,
    ) -> Self {
        self.generators.insert(prefix, generator);
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Prepare the store: the sets root container must exist.
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<()> {
        if self.ensure_sets_root().await? {
            info!(path = %self.config.sets_root_path, "Created sets root");
        }
        Ok(())
    }

    async fn ensure_sets_root(&self) -> Result<bool> {
        let root = Resource::new(&self.config.sets_root_path, "oai:setsRoot");
        self.repository.create_if_absent(&root).await
    }

    /// Answer one request.
    #[instrument(skip_all, fields(verb = request.verb.as_deref().unwrap_or("-")))]
    pub async fn handle(&self, request: OaiRequest, ctx: &RequestContext) -> Result<OaiResponse> {
        let request = request.normalized();
        let response_date = Utc::now();

        let command = match &request.resumption_token {
            Some(token) => {
                debug!("Resolving resumption token");
                token::decode(token).map(Command::List)
            }
            None => {
                debug!("Reading parameters");
                validate(&request)
            }
        };

        let (verb, body) = match command {
            Ok(command) => {
                let verb = command.verb();
                debug!(%verb, "Executing");
                match self.execute(command, ctx).await {
                    Ok(body) => (Some(verb), body),
                    Err(Error::Protocol(e)) => (Some(verb), ResponseBody::Errors(vec![e])),
                    Err(e) => return Err(e),
                }
            }
            Err(e) => {
                let verb = request.verb.as_deref().and_then(|v| v.parse::<Verb>().ok());
                (verb, ResponseBody::Errors(vec![e]))
            }
        };

        if let ResponseBody::Errors(errors) = &body {
            for e in errors {
                debug!(code = e.code.as_str(), message = %e.message, "Protocol error");
            }
        }

        Ok(OaiResponse {
            response_date,
            request: RequestEcho {
                url: ctx.endpoint.clone(),
                verb,
                arguments: request,
            },
            body,
        })
    }

    /// An error response for a request that could not be read at all.
    pub fn reject(&self, error: OaiError, ctx: &RequestContext) -> OaiResponse {
        debug!(code = error.code.as_str(), message = %error.message, "Rejected request");
        OaiResponse {
            response_date: Utc::now(),
            request: RequestEcho {
                url: ctx.endpoint.clone(),
                ..RequestEcho::default()
            },
            body: ResponseBody::Errors(vec![error]),
        }
    }

    async fn execute(&self, command: Command, ctx: &RequestContext) -> Result<ResponseBody> {
        match command {
            Command::Identify => self.identify(ctx).await.map(ResponseBody::Identify),
            Command::ListMetadataFormats { identifier } => self
                .list_metadata_formats(identifier.as_deref(), ctx)
                .await
                .map(ResponseBody::ListMetadataFormats),
            Command::GetRecord {
                identifier,
                metadata_prefix,
            } => self
                .get_record(&identifier, &metadata_prefix, ctx)
                .await
                .map(ResponseBody::GetRecord),
            Command::List(query) => match query.verb {
                Verb::ListSets => self.list_sets(&query).await.map(ResponseBody::ListSets),
                Verb::ListRecords => self
                    .list_records(&query, ctx)
                    .await
                    .map(ResponseBody::ListRecords),
                _ => self
                    .list_identifiers(&query, ctx)
                    .await
                    .map(ResponseBody::ListIdentifiers),
            },
        }
    }

    fn assembler<'a>(&'a self, ctx: &'a RequestContext) -> Assembler<'a> {
        Assembler {
            repository: &self.repository,
            config: &self.config,
            generators: &self.generators,
            base: &ctx.base,
        }
    }

    async fn identify(&self, ctx: &RequestContext) -> Result<Identify> {
        let earliest = self
            .repository
            .earliest_modified(&self.config.record_kind)
            .await?
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        Ok(Identify {
            repository_name: self.config.repository_name.clone(),
            base_url: ctx.endpoint.clone(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            earliest_datestamp: earliest,
            deleted_record: "no".to_string(),
            granularity: GRANULARITY.to_string(),
            admin_emails: self.config.admin_emails.clone(),
        })
    }

    /// Look up an item by identifier (URI under the base or bare path).
    async fn item(&self, identifier: &str, ctx: &RequestContext) -> Result<Resource> {
        let not_found = || OaiError::id_does_not_exist(format!("'{}' is unknown", identifier));

        let path = ctx.base.uri_to_path(identifier).ok_or_else(not_found)?;
        match self.repository.resource(&path).await? {
            Some(resource) if resource.kind == self.config.record_kind => Ok(resource),
            _ => Err(not_found().into()),
        }
    }

    fn format(&self, prefix: &str) -> Result<&MetadataFormat> {
        self.registry.get(prefix).ok_or_else(|| {
            OaiError::cannot_disseminate_format(format!("'{}' is not supported", prefix)).into()
        })
    }

    async fn list_metadata_formats(
        &self,
        identifier: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Vec<MetadataFormat>> {
        let Some(identifier) = identifier else {
            return Ok(self.registry.all().to_vec());
        };

        let resource = self.item(identifier, ctx).await?;
        Ok(self
            .registry
            .all()
            .iter()
            .filter(|f| {
                f.is_default()
                    || f.selector_property
                        .as_deref()
                        .is_some_and(|p| resource.has_property(p))
            })
            .cloned()
            .collect())
    }

    async fn get_record(
        &self,
        identifier: &str,
        prefix: &str,
        ctx: &RequestContext,
    ) -> Result<Record> {
        let format = self.format(prefix)?;
        let resource = self.item(identifier, ctx).await?;
        self.assembler(ctx).record(&resource, format).await
    }

    /// Run the list query and cut the page; empty results are `noRecordsMatch`.
    async fn list_page_rows(&self, query: &ResumptionToken) -> Result<ListPage<String>> {
        let spec = self.planner.plan(
            &self.config.record_kind,
            query.from.as_deref(),
            query.until.as_deref(),
            query.set.as_deref(),
            query.offset,
        )?;

        let rows = self.repository.query(&spec).await?;
        debug!(rows = rows.len(), offset = query.offset, "List query");
        if rows.is_empty() {
            return Err(OaiError::no_records_match("The query returned no results").into());
        }

        Ok(assemble_list_page(
            rows,
            query,
            self.planner.page_size(),
            self.planner.paging(),
        ))
    }

    /// Fetch the resources of a page, skipping any removed since the query.
    async fn page_resources(&self, rows: &[String]) -> Result<Vec<Resource>> {
        let mut resources = Vec::with_capacity(rows.len());
        for path in rows {
            match self.repository.resource(path).await? {
                Some(resource) => resources.push(resource),
                None => warn!(%path, "Listed resource disappeared"),
            }
        }
        Ok(resources)
    }

    async fn list_identifiers(
        &self,
        query: &ResumptionToken,
        ctx: &RequestContext,
    ) -> Result<ListPage<Header>> {
        self.format(&query.metadata_prefix)?;
        let page = self.list_page_rows(query).await?;
        let assembler = self.assembler(ctx);

        let mut headers = Vec::with_capacity(page.items.len());
        for resource in self.page_resources(&page.items).await? {
            headers.push(assembler.header(&resource).await?);
        }

        Ok(ListPage {
            items: headers,
            resumption_token: page.resumption_token,
            cursor: page.cursor,
        })
    }

    async fn list_records(
        &self,
        query: &ResumptionToken,
        ctx: &RequestContext,
    ) -> Result<ListPage<Record>> {
        let format = self.format(&query.metadata_prefix)?;
        let page = self.list_page_rows(query).await?;
        let assembler = self.assembler(ctx);

        let mut records = Vec::with_capacity(page.items.len());
        for resource in self.page_resources(&page.items).await? {
            records.push(assembler.record(&resource, format).await?);
        }

        Ok(ListPage {
            items: records,
            resumption_token: page.resumption_token,
            cursor: page.cursor,
        })
    }

    async fn list_sets(&self, query: &ResumptionToken) -> Result<ListPage<SetDescriptor>> {
        if !self.config.sets_enabled {
            return Err(OaiError::no_set_hierarchy("Sets are not enabled").into());
        }

        // Set pages always look ahead so a resumed page is never empty.
        let mut spec = self
            .planner
            .plan(&self.config.set_kind, None, None, None, query.offset)?;
        spec.limit = self.planner.page_size().saturating_add(1);
        let rows = self.repository.query(&spec).await?;
        debug!(rows = rows.len(), offset = query.offset, "Set query");
        let page = assemble_list_page(
            rows,
            query,
            self.planner.page_size(),
            PagingMode::Lookahead,
        );

        let props = &self.config.properties;
        let mut sets = Vec::with_capacity(page.items.len());
        for resource in self.page_resources(&page.items).await? {
            let Some(spec) = resource.property(&props.has_set_spec) else {
                warn!(path = %resource.path, "Set object without spec");
                continue;
            };
            sets.push(SetDescriptor {
                set_spec: spec.to_string(),
                set_name: resource
                    .property(&props.set_name)
                    .unwrap_or_default()
                    .to_string(),
                set_description: resource.property(&props.set_description).map(String::from),
            });
        }

        if sets.is_empty() && query.offset > 0 {
            return Err(OaiError::no_records_match("No sets at this offset").into());
        }

        Ok(ListPage {
            items: sets,
            resumption_token: page.resumption_token,
            cursor: page.cursor,
        })
    }

    /// Create a set object under the sets root.
    ///
    /// The set's id is the last `:`-separated segment of its spec. Returns
    /// the repository path of the new set.
    #[instrument(skip(self), fields(spec = %descriptor.set_spec))]
    pub async fn create_set(&self, descriptor: &SetDescriptor) -> Result<String> {
        if !self.config.sets_enabled {
            return Err(InvalidInputError::SetsDisabled.into());
        }

        let spec = descriptor.set_spec.trim();
        let invalid = |reason: &str| InvalidInputError::SetDescriptor {
            spec: descriptor.set_spec.clone(),
            reason: reason.to_string(),
        };
        if spec.is_empty() {
            return Err(invalid("setSpec must not be empty").into());
        }
        let id = set_id(spec);
        if id.is_empty() {
            return Err(invalid("setSpec must not end with ':'").into());
        }
        if id.contains('/') {
            return Err(invalid("set id must not contain '/'").into());
        }

        let path = normalize_path(&format!("{}/{}", self.config.sets_root_path, id));
        if self.repository.exists(&path).await? {
            return Err(InvalidInputError::SetExists { id: id.to_string() }.into());
        }

        let props = &self.config.properties;
        let mut set = Resource::new(&path, &self.config.set_kind)
            .with_property(props.set_name.clone(), descriptor.set_name.clone())
            .with_property(props.has_set_spec.clone(), spec);
        if let Some(description) = &descriptor.set_description {
            set = set.with_property(props.set_description.clone(), description.clone());
        }

        self.ensure_sets_root().await?;
        if !self.repository.create_if_absent(&set).await? {
            return Err(InvalidInputError::SetExists { id: id.to_string() }.into());
        }
        self.repository
            .add_property(
                &self.config.sets_root_path,
                Property::new(props.has_sets.clone(), path.clone()),
            )
            .await?;

        info!(%path, "Created set");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OaiErrorCode;
    use crate::testing::MemoryRepository;
    use chrono::TimeZone;

    const BASE: &str = "http://localhost:8080/rest/";

    fn ctx() -> RequestContext {
        RequestContext::new(BaseUrl::new(BASE).unwrap(), "http://localhost:8080/oai")
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn provider(config: ProviderConfig) -> OaiProvider<MemoryRepository> {
        OaiProvider::new(MemoryRepository::new(), config).unwrap()
    }

    fn seed(provider: &OaiProvider<MemoryRepository>, count: u32) {
        for i in 1..=count {
            provider.repository().insert(
                Resource::new(format!("objects/{:02}", i), "fedora:object")
                    .with_last_modified(at(i)),
            );
        }
    }

    fn codes(response: &OaiResponse) -> Vec<OaiErrorCode> {
        response.errors().iter().map(|e| e.code).collect()
    }

    #[tokio::test]
    async fn identify_returns_block_without_errors() {
        let p = provider(ProviderConfig::default());
        seed(&p, 3);

        let response = p.handle(OaiRequest::verb("Identify"), &ctx()).await.unwrap();
        let ResponseBody::Identify(identify) = &response.body else {
            panic!("expected Identify, got {:?}", response.body);
        };
        assert!(response.errors().is_empty());
        assert_eq!(identify.earliest_datestamp, at(1));
        assert_eq!(identify.base_url, "http://localhost:8080/oai");
        assert_eq!(response.request.verb, Some(Verb::Identify));
    }

    #[tokio::test]
    async fn identify_with_any_argument_is_bad_argument() {
        let p = provider(ProviderConfig::default());
        let requests = [
            OaiRequest::verb("Identify").with_identifier("x"),
            OaiRequest::verb("Identify").with_metadata_prefix("oai_dc"),
            OaiRequest::verb("Identify").with_from("2024-01-01"),
            OaiRequest::verb("Identify").with_until("2024-01-01"),
            OaiRequest::verb("Identify").with_set("s"),
        ];

        for request in requests {
            let response = p.handle(request, &ctx()).await.unwrap();
            assert_eq!(codes(&response), vec![OaiErrorCode::BadArgument]);
        }
    }

    #[tokio::test]
    async fn unknown_verb_is_bad_verb() {
        let p = provider(ProviderConfig::default());
        let response = p.handle(OaiRequest::verb("Harvest"), &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::BadVerb]);
        assert_eq!(response.request.verb, None);
    }

    #[tokio::test]
    async fn get_record_checks_prefix_then_identifier() {
        let p = provider(ProviderConfig::default());
        seed(&p, 1);

        let bad_prefix = OaiRequest::verb("GetRecord")
            .with_identifier("objects/missing")
            .with_metadata_prefix("mods");
        let response = p.handle(bad_prefix, &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::CannotDisseminateFormat]);

        let bad_id = OaiRequest::verb("GetRecord")
            .with_identifier(format!("{}objects/missing", BASE))
            .with_metadata_prefix("oai_dc");
        let response = p.handle(bad_id, &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::IdDoesNotExist]);

        let foreign = OaiRequest::verb("GetRecord")
            .with_identifier("http://elsewhere.org/rest/objects/01")
            .with_metadata_prefix("oai_dc");
        let response = p.handle(foreign, &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::IdDoesNotExist]);
    }

    #[tokio::test]
    async fn get_record_by_uri_or_path() {
        let p = provider(ProviderConfig::default());
        seed(&p, 1);

        for identifier in [format!("{}objects/01", BASE), "objects/01".to_string()] {
            let request = OaiRequest::verb("GetRecord")
                .with_identifier(identifier)
                .with_metadata_prefix("oai_dc");
            let response = p.handle(request, &ctx()).await.unwrap();
            let ResponseBody::GetRecord(record) = &response.body else {
                panic!("expected GetRecord, got {:?}", response.body);
            };
            assert_eq!(record.header.identifier, format!("{}objects/01", BASE));
            assert!(record.metadata.is_some());
        }
    }

    #[tokio::test]
    async fn list_metadata_formats_for_item_follows_selectors() {
        let mut config = ProviderConfig::default();
        config.metadata_formats.push(MetadataFormat {
            prefix: "marc21".to_string(),
            schema_url: "http://www.loc.gov/standards/marcxml/schema/MARC21slim.xsd".to_string(),
            namespace: "http://www.loc.gov/MARC21/slim".to_string(),
            selector_property: Some("urn:hasMarc".to_string()),
        });
        let p = provider(config);
        p.repository()
            .insert(Resource::new("objects/plain", "fedora:object"));
        p.repository().insert(
            Resource::new("objects/marc", "fedora:object")
                .with_property("urn:hasMarc", "binaries/marc"),
        );

        let prefixes = |response: &OaiResponse| match &response.body {
            ResponseBody::ListMetadataFormats(formats) => {
                formats.iter().map(|f| f.prefix.clone()).collect::<Vec<_>>()
            }
            other => panic!("expected ListMetadataFormats, got {:?}", other),
        };

        let all = p
            .handle(OaiRequest::verb("ListMetadataFormats"), &ctx())
            .await
            .unwrap();
        assert_eq!(prefixes(&all), vec!["oai_dc", "marc21"]);

        let plain = OaiRequest::verb("ListMetadataFormats").with_identifier("objects/plain");
        assert_eq!(prefixes(&p.handle(plain, &ctx()).await.unwrap()), vec!["oai_dc"]);

        let marc = OaiRequest::verb("ListMetadataFormats").with_identifier("objects/marc");
        assert_eq!(
            prefixes(&p.handle(marc, &ctx()).await.unwrap()),
            vec!["oai_dc", "marc21"]
        );

        let missing = OaiRequest::verb("ListMetadataFormats").with_identifier("objects/none");
        let response = p.handle(missing, &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::IdDoesNotExist]);
    }

    #[tokio::test]
    async fn set_filter_with_sets_disabled_never_queries() {
        let p = provider(ProviderConfig {
            sets_enabled: false,
            ..ProviderConfig::default()
        });
        seed(&p, 2);

        for verb in ["ListIdentifiers", "ListRecords"] {
            let request = OaiRequest::verb(verb)
                .with_metadata_prefix("oai_dc")
                .with_set("anything");
            let response = p.handle(request, &ctx()).await.unwrap();
            assert_eq!(codes(&response), vec![OaiErrorCode::NoSetHierarchy], "{verb}");
            assert_eq!(p.repository().query_count(), 0, "{verb}");
        }

        let response = p.handle(OaiRequest::verb("ListSets"), &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::NoSetHierarchy]);
        assert_eq!(p.repository().query_count(), 0);
    }

    #[tokio::test]
    async fn empty_result_is_no_records_match() {
        let p = provider(ProviderConfig::default());
        let request = OaiRequest::verb("ListRecords").with_metadata_prefix("oai_dc");
        let response = p.handle(request, &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::NoRecordsMatch]);
    }

    #[tokio::test]
    async fn inverted_range_yields_single_no_records_match() {
        let p = provider(ProviderConfig::default());
        for day in 1..=3 {
            p.repository().insert(
                Resource::new(format!("objects/{:02}", day), "fedora:object")
                    .with_last_modified(Utc.with_ymd_and_hms(2014, 1, day, 20, 30, 0).unwrap()),
            );
        }

        for verb in ["ListRecords", "ListIdentifiers"] {
            let request = OaiRequest::verb(verb)
                .with_metadata_prefix("oai_dc")
                .with_from("2014-01-02T20:30:00Z")
                .with_until("2014-01-01T20:30:00Z");
            let response = p.handle(request, &ctx()).await.unwrap();
            assert_eq!(codes(&response), vec![OaiErrorCode::NoRecordsMatch], "{verb}");
        }
    }

    #[tokio::test]
    async fn list_records_unknown_prefix() {
        let p = provider(ProviderConfig::default());
        seed(&p, 1);
        let request = OaiRequest::verb("ListRecords").with_metadata_prefix("mods");
        let response = p.handle(request, &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::CannotDisseminateFormat]);
    }

    #[tokio::test]
    async fn full_pages_chain_tokens_until_short_page() {
        let p = provider(ProviderConfig {
            max_list_size: 2,
            ..ProviderConfig::default()
        });
        seed(&p, 5);

        let mut request = OaiRequest::verb("ListIdentifiers").with_metadata_prefix("oai_dc");
        let mut seen = Vec::new();
        let mut offsets = Vec::new();
        loop {
            let response = p.handle(request, &ctx()).await.unwrap();
            let ResponseBody::ListIdentifiers(page) = &response.body else {
                panic!("expected ListIdentifiers, got {:?}", response.body);
            };
            seen.extend(page.items.iter().map(|h| h.identifier.clone()));
            match &page.resumption_token {
                Some(token) => {
                    offsets.push(token::decode(token).unwrap().offset);
                    request = OaiRequest::resume(token.clone());
                }
                None => break,
            }
        }

        assert_eq!(offsets, vec![2, 4]);
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], format!("{}objects/01", BASE));
    }

    #[tokio::test]
    async fn exact_multiple_ends_with_no_records_match_in_full_page_mode() {
        let p = provider(ProviderConfig {
            max_list_size: 2,
            ..ProviderConfig::default()
        });
        seed(&p, 2);

        let first = OaiRequest::verb("ListIdentifiers").with_metadata_prefix("oai_dc");
        let response = p.handle(first, &ctx()).await.unwrap();
        let token = response.resumption_token().unwrap().to_string();

        let response = p.handle(OaiRequest::resume(token), &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::NoRecordsMatch]);
    }

    #[tokio::test]
    async fn lookahead_does_not_emit_token_on_exact_multiple() {
        let p = provider(ProviderConfig {
            max_list_size: 2,
            paging: PagingMode::Lookahead,
            ..ProviderConfig::default()
        });
        seed(&p, 2);

        let request = OaiRequest::verb("ListIdentifiers").with_metadata_prefix("oai_dc");
        let response = p.handle(request, &ctx()).await.unwrap();
        assert!(!response.is_error());
        assert_eq!(response.resumption_token(), None);
    }

    #[tokio::test]
    async fn token_supersedes_other_arguments() {
        let p = provider(ProviderConfig::default());
        seed(&p, 1);

        let garbage = OaiRequest::resume("!!not a token!!")
            .with_metadata_prefix("oai_dc")
            .with_identifier("x");
        let response = p.handle(garbage, &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::BadResumptionToken]);

        let token = token::encode(Verb::ListRecords, "oai_dc", None, None, None, 0);
        let mut request = OaiRequest::resume(token).with_identifier("ignored");
        request.verb = Some("Identify".to_string());
        let response = p.handle(request, &ctx()).await.unwrap();
        assert!(matches!(response.body, ResponseBody::ListRecords(_)));
        assert_eq!(response.request.verb, Some(Verb::ListRecords));
    }

    #[tokio::test]
    async fn create_set_and_list_membership() {
        let p = provider(ProviderConfig::default());
        p.init().await.unwrap();

        let mut descriptor = SetDescriptor::new("parent:child", "Child set");
        descriptor.set_description = Some("A child".to_string());
        let path = p.create_set(&descriptor).await.unwrap();
        assert_eq!(path, "oai/sets/child");

        let duplicate = p.create_set(&descriptor).await.unwrap_err();
        assert!(matches!(
            duplicate,
            Error::InvalidInput(InvalidInputError::SetExists { ref id }) if id == "child"
        ));

        let root = p.repository().resource("oai/sets").await.unwrap().unwrap();
        let has_sets = &p.config().properties.has_sets;
        assert_eq!(root.property(has_sets), Some("oai/sets/child"));

        p.repository().insert(
            Resource::new("objects/a", "fedora:object")
                .with_property(p.config().properties.is_part_of_set.clone(), "child"),
        );
        p.repository()
            .insert(Resource::new("objects/b", "fedora:object"));

        let request = OaiRequest::verb("ListIdentifiers")
            .with_metadata_prefix("oai_dc")
            .with_set("parent:child");
        let response = p.handle(request, &ctx()).await.unwrap();
        let ResponseBody::ListIdentifiers(page) = &response.body else {
            panic!("expected ListIdentifiers, got {:?}", response.body);
        };
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].set_specs, vec!["parent:child".to_string()]);

        let response = p.handle(OaiRequest::verb("ListSets"), &ctx()).await.unwrap();
        let ResponseBody::ListSets(sets) = &response.body else {
            panic!("expected ListSets, got {:?}", response.body);
        };
        assert_eq!(sets.items, vec![descriptor]);
    }

    #[tokio::test]
    async fn set_pages_never_end_empty() {
        let p = provider(ProviderConfig {
            max_list_size: 2,
            ..ProviderConfig::default()
        });
        p.init().await.unwrap();
        for spec in ["a", "b"] {
            p.create_set(&SetDescriptor::new(spec, spec)).await.unwrap();
        }

        let response = p.handle(OaiRequest::verb("ListSets"), &ctx()).await.unwrap();
        let ResponseBody::ListSets(page) = &response.body else {
            panic!("expected ListSets, got {:?}", response.body);
        };
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.resumption_token, None);

        p.create_set(&SetDescriptor::new("c", "c")).await.unwrap();
        let response = p.handle(OaiRequest::verb("ListSets"), &ctx()).await.unwrap();
        let ResponseBody::ListSets(page) = &response.body else {
            panic!("expected ListSets, got {:?}", response.body);
        };
        let token = page.resumption_token.clone().expect("continuation");
        let response = p.handle(OaiRequest::resume(token), &ctx()).await.unwrap();
        let ResponseBody::ListSets(page) = &response.body else {
            panic!("expected ListSets, got {:?}", response.body);
        };
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.cursor, 2);

        let past_end = token::encode(Verb::ListSets, "", None, None, None, 4);
        let response = p.handle(OaiRequest::resume(past_end), &ctx()).await.unwrap();
        assert_eq!(codes(&response), vec![OaiErrorCode::NoRecordsMatch]);
    }

    #[tokio::test]
    async fn create_set_rejects_bad_descriptors() {
        let p = provider(ProviderConfig::default());
        for spec in ["", "  ", "parent:"] {
            let err = p
                .create_set(&SetDescriptor::new(spec, "name"))
                .await
                .unwrap_err();
            assert!(
                matches!(err, Error::InvalidInput(InvalidInputError::SetDescriptor { .. })),
                "{spec:?} gave {err:?}"
            );
        }

        let disabled = provider(ProviderConfig {
            sets_enabled: false,
            ..ProviderConfig::default()
        });
        let err = disabled
            .create_set(&SetDescriptor::new("a", "A"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(InvalidInputError::SetsDisabled)));
    }
}
