//! Request command implementation.

use anyhow::{Context, Result};
use clap::Args;

use oaipmh_core::response::ResponseBody;
use oaipmh_core::types::BaseUrl;
use oaipmh_core::{OaiRequest, RequestContext, xml};

use crate::output;

use super::Globals;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Protocol verb (e.g. Identify, ListRecords)
    pub verb: Option<String>,

    #[arg(long)]
    pub identifier: Option<String>,

    #[arg(long = "metadata-prefix", short = 'm')]
    pub metadata_prefix: Option<String>,

    #[arg(long)]
    pub from: Option<String>,

    #[arg(long)]
    pub until: Option<String>,

    #[arg(long)]
    pub set: Option<String>,

    #[arg(long = "resumption-token")]
    pub resumption_token: Option<String>,

    /// Keep following resumption tokens until the list is complete
    #[arg(long)]
    pub all: bool,

    /// Base URL for identifiers when the config has no public base URL
    #[arg(long, default_value = "http://localhost:8080/rest/")]
    pub base_url: String,
}

impl RequestArgs {
    fn to_request(&self) -> OaiRequest {
        OaiRequest {
            verb: self.verb.clone(),
            identifier: self.identifier.clone(),
            metadata_prefix: self.metadata_prefix.clone(),
            from: self.from.clone(),
            until: self.until.clone(),
            set: self.set.clone(),
            resumption_token: self.resumption_token.clone(),
        }
    }
}

pub async fn run(args: RequestArgs, globals: &Globals) -> Result<()> {
    let provider = globals.provider().await?;

    let base = provider
        .config()
        .public_base_url
        .as_deref()
        .unwrap_or(&args.base_url);
    let base = BaseUrl::new(base).context("Invalid base URL")?;
    let ctx = RequestContext::new(base.clone(), base.on_origin("/oai"));

    let mut request = args.to_request();
    let mut page = 0;
    loop {
        let response = provider
            .handle(request, &ctx)
            .await
            .context("Request failed")?;
        println!("{}", xml::render(&response));

        for e in response.errors() {
            output::protocol_error(e);
        }

        let token = response.resumption_token();
        if args.all {
            if let Some(items) = list_len(&response.body) {
                page += 1;
                output::page_progress(page, items, token.is_some());
            }
        }

        match token {
            Some(token) if args.all => request = OaiRequest::resume(token),
            _ => break,
        }
    }

    Ok(())
}

fn list_len(body: &ResponseBody) -> Option<usize> {
    match body {
        ResponseBody::ListIdentifiers(page) => Some(page.items.len()),
        ResponseBody::ListRecords(page) => Some(page.items.len()),
        ResponseBody::ListSets(page) => Some(page.items.len()),
        _ => None,
    }
}
