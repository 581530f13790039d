//! Default `oai_dc` generator.

use async_trait::async_trait;

use crate::Result;
use crate::traits::{FormatGenerator, GenerateContext};
use crate::types::{MetadataFormat, Resource, format_datestamp};
use crate::xml::{DC_NAMESPACE, OAI_DC_NAMESPACE, OAI_DC_SCHEMA, XSI_NAMESPACE, XmlWriter};

/// The fifteen simple Dublin Core elements.
const DC_ELEMENTS: [&str; 15] = [
    "title",
    "creator",
    "subject",
    "description",
    "publisher",
    "contributor",
    "date",
    "type",
    "format",
    "identifier",
    "source",
    "language",
    "relation",
    "coverage",
    "rights",
];

/// Synthesizes simple Dublin Core from a resource's own properties.
///
/// Properties in the DC element namespace map onto their element. Every
/// other property becomes a `dc:relation` of the form `predicate value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DublinCoreGenerator;

impl DublinCoreGenerator {
    pub fn render(resource: &Resource, ctx: &GenerateContext<'_>) -> String {
        let schema_location = format!("{} {}", OAI_DC_NAMESPACE, OAI_DC_SCHEMA);
        let mut w = XmlWriter::new();
        w.open(
            "oai_dc:dc",
            &[
                ("xmlns:oai_dc", OAI_DC_NAMESPACE),
                ("xmlns:dc", DC_NAMESPACE),
                ("xmlns:xsi", XSI_NAMESPACE),
                ("xsi:schemaLocation", &schema_location),
            ],
        );

        w.text("dc:identifier", &[], &ctx.base.path_to_uri(&resource.path));
        w.text("dc:date", &[], &format_datestamp(&resource.created));
        if let Some(creator) = resource.property(&ctx.properties.created_by) {
            w.text("dc:creator", &[], creator);
        }

        for property in &resource.properties {
            if property.predicate == ctx.properties.created_by {
                continue;
            }
            match dc_element(&property.predicate) {
                Some(element) => {
                    w.text(&format!("dc:{}", element), &[], &property.value);
                }
                None => {
                    w.text(
                        "dc:relation",
                        &[],
                        &format!("{} {}", property.predicate, property.value),
                    );
                }
            }
        }

        w.close("oai_dc:dc");
        w.finish()
    }
}

fn dc_element(predicate: &str) -> Option<&str> {
    predicate
        .strip_prefix(DC_NAMESPACE)
        .filter(|local| DC_ELEMENTS.contains(local))
}

#[async_trait]
impl FormatGenerator for DublinCoreGenerator {
    async fn generate(
        &self,
        resource: &Resource,
        _format: &MetadataFormat,
        ctx: &GenerateContext<'_>,
    ) -> Result<Option<String>> {
        Ok(Some(Self::render(resource, ctx)))
    }
}
