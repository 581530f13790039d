//! OAI-PMH XML rendering.
//!
//! Produces the OAI-PMH 2.0 envelope for an [`OaiResponse`]. Character data
//! and attribute values are escaped; metadata payloads are embedded as-is
//! since generators already produce XML.

use std::borrow::Cow;

use crate::error::OaiErrorCode;
use crate::response::{ListPage, OaiResponse, ResponseBody};
use crate::types::{Header, Record, SetDescriptor, format_datestamp};

pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";
const OAI_SCHEMA: &str = "http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const OAI_DC_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";
pub const OAI_DC_SCHEMA: &str = "http://www.openarchives.org/OAI/2.0/oai_dc.xsd";
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

/// Characters XML 1.0 cannot represent at all, even as references.
fn is_forbidden(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Escape text for use in character data or attribute values.
///
/// Characters outside the XML 1.0 character range are dropped.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'') || is_forbidden(c)) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_forbidden(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Minimal streaming XML writer.
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a document with the XML declaration.
    pub fn document() -> Self {
        Self {
            out: "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n".to_string(),
        }
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value));
            self.out.push('"');
        }
    }

    pub fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.tag(name, attrs);
        self.out.push('>');
        self
    }

    pub fn close(&mut self, name: &str) -> &mut Self {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
        self
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.tag(name, attrs);
        self.out.push_str("/>");
        self
    }

    /// An element with escaped text content.
    pub fn text(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> &mut Self {
        self.open(name, attrs);
        self.out.push_str(&escape(text));
        self.close(name)
    }

    /// Append pre-rendered XML verbatim.
    pub fn raw(&mut self, xml: &str) -> &mut Self {
        self.out.push_str(xml);
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Render a response as an OAI-PMH document.
pub fn render(response: &OaiResponse) -> String {
    let mut w = XmlWriter::document();
    let schema_location = format!("{} {}", OAI_NAMESPACE, OAI_SCHEMA);
    w.open(
        "OAI-PMH",
        &[
            ("xmlns", OAI_NAMESPACE),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:schemaLocation", &schema_location),
        ],
    );
    w.text(
        "responseDate",
        &[],
        &format_datestamp(&response.response_date),
    );
    render_request(&mut w, response);

    match &response.body {
        ResponseBody::Errors(errors) => {
            for error in errors {
                w.text("error", &[("code", error.code.as_str())], &error.message);
            }
        }
        ResponseBody::Identify(id) => {
            w.open("Identify", &[]);
            w.text("repositoryName", &[], &id.repository_name);
            w.text("baseURL", &[], &id.base_url);
            w.text("protocolVersion", &[], &id.protocol_version);
            for email in &id.admin_emails {
                w.text("adminEmail", &[], email);
            }
            w.text(
                "earliestDatestamp",
                &[],
                &format_datestamp(&id.earliest_datestamp),
            );
            w.text("deletedRecord", &[], &id.deleted_record);
            w.text("granularity", &[], &id.granularity);
            w.close("Identify");
        }
        ResponseBody::ListMetadataFormats(formats) => {
            w.open("ListMetadataFormats", &[]);
            for format in formats {
                w.open("metadataFormat", &[]);
                w.text("metadataPrefix", &[], &format.prefix);
                w.text("schema", &[], &format.schema_url);
                w.text("metadataNamespace", &[], &format.namespace);
                w.close("metadataFormat");
            }
            w.close("ListMetadataFormats");
        }
        ResponseBody::GetRecord(record) => {
            w.open("GetRecord", &[]);
            render_record(&mut w, record);
            w.close("GetRecord");
        }
        ResponseBody::ListIdentifiers(page) => {
            render_page(&mut w, "ListIdentifiers", page, render_header);
        }
        ResponseBody::ListRecords(page) => {
            render_page(&mut w, "ListRecords", page, render_record);
        }
        ResponseBody::ListSets(page) => {
            render_page(&mut w, "ListSets", page, render_set);
        }
    }

    w.close("OAI-PMH");
    w.finish()
}

fn render_request(w: &mut XmlWriter, response: &OaiResponse) {
    let echo = &response.request;

    // badVerb and badArgument responses must not echo the arguments.
    let suppress = response
        .errors()
        .iter()
        .any(|e| matches!(e.code, OaiErrorCode::BadVerb | OaiErrorCode::BadArgument));

    let mut attrs: Vec<(&str, &str)> = Vec::new();
    if !suppress {
        let args = &echo.arguments;
        if let Some(verb) = echo.verb {
            attrs.push(("verb", verb.as_str()));
        }
        let named = [
            ("identifier", &args.identifier),
            ("metadataPrefix", &args.metadata_prefix),
            ("from", &args.from),
            ("until", &args.until),
            ("set", &args.set),
            ("resumptionToken", &args.resumption_token),
        ];
        for (name, value) in named {
            if let Some(value) = value {
                attrs.push((name, value.as_str()));
            }
        }
    }
    w.text("request", &attrs, &echo.url);
}

fn render_page<T>(
    w: &mut XmlWriter,
    name: &str,
    page: &ListPage<T>,
    item: fn(&mut XmlWriter, &T),
) {
    w.open(name, &[]);
    for entry in &page.items {
        item(w, entry);
    }
    let cursor = page.cursor.to_string();
    match &page.resumption_token {
        Some(token) => {
            w.text("resumptionToken", &[("cursor", &cursor)], token);
        }
        // The last page of a resumed list carries an empty token.
        None if page.cursor > 0 => {
            w.empty("resumptionToken", &[("cursor", &cursor)]);
        }
        None => {}
    }
    w.close(name);
}

fn render_header(w: &mut XmlWriter, header: &Header) {
    w.open("header", &[]);
    w.text("identifier", &[], &header.identifier);
    w.text("datestamp", &[], &header.datestamp_str());
    for spec in &header.set_specs {
        w.text("setSpec", &[], spec);
    }
    w.close("header");
}

fn render_record(w: &mut XmlWriter, record: &Record) {
    w.open("record", &[]);
    render_header(w, &record.header);
    if let Some(metadata) = &record.metadata {
        w.open("metadata", &[]);
        w.raw(metadata);
        w.close("metadata");
    }
    w.close("record");
}

fn render_set(w: &mut XmlWriter, set: &SetDescriptor) {
    w.open("set", &[]);
    w.text("setSpec", &[], &set.set_spec);
    w.text("setName", &[], &set.set_name);
    if let Some(description) = &set.set_description {
        let schema_location = format!("{} {}", OAI_DC_NAMESPACE, OAI_DC_SCHEMA);
        w.open("setDescription", &[]);
        w.open(
            "oai_dc:dc",
            &[
                ("xmlns:oai_dc", OAI_DC_NAMESPACE),
                ("xmlns:dc", DC_NAMESPACE),
                ("xsi:schemaLocation", &schema_location),
            ],
        );
        w.text("dc:description", &[], description);
        w.close("oai_dc:dc");
        w.close("setDescription");
    }
    w.close("set");
}
