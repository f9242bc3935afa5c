use std::borrow::Cow;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::encoding::{decode, detect_encoding};
use quick_xml::events::Event;
use tracing::debug;

use super::accessor::FieldAccessor;
use super::fallback::FallbackChain;
use super::lines::extract_lines;
use super::party::{PartyRole, resolve_party};
use super::sector::extract_sector_fields;
use super::taxes::{document_taxes, document_withholdings};
use super::totals::{resolve_payment, resolve_totals};
use crate::core::{
    DianError, DocumentKind, DocumentLayout, DocumentRecord, Header, ParseFailure, ParserConfig,
};
use crate::xml::XmlDocument;

/// Parse one DIAN XML file into a [`DocumentRecord`].
///
/// Any failure (unreadable file, no usable XML) comes back as a
/// [`ParseFailure`] naming the file; this function never panics on bad input.
/// Non-UTF-8 files are decoded per their BOM or XML declaration.
pub fn parse_document(path: &Path, config: &ParserConfig) -> Result<DocumentRecord, ParseFailure> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    read_and_parse(path, &file_name, config).map_err(|e| ParseFailure::from_error(path, &e))
}

fn read_and_parse(
    path: &Path,
    file_name: &str,
    config: &ParserConfig,
) -> Result<DocumentRecord, DianError> {
    let bytes = std::fs::read(path)?;
    let xml = decode_input(&bytes);
    parse_str(&xml, file_name, config)
}

/// Decode file bytes to text.
///
/// A UTF-16 byte order mark wins, then the `encoding` of the XML declaration;
/// anything else is read as UTF-8 with invalid sequences replaced.
fn decode_input(bytes: &[u8]) -> Cow<'_, str> {
    let decoded = match detect_encoding(bytes) {
        Some((encoding, bom)) if encoding.name() != "UTF-8" => decode(&bytes[bom..], encoding).ok(),
        _ => decode_declared(bytes),
    };
    decoded.unwrap_or_else(|| String::from_utf8_lossy(bytes))
}

/// Decode with the declared encoding, if there is a non-UTF-8 declaration.
fn decode_declared(bytes: &[u8]) -> Option<Cow<'_, str>> {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = Reader::from_reader(body);
    let Ok(Event::Decl(decl)) = reader.read_event() else {
        return None;
    };
    let encoding = decl.encoder()?;
    if encoding.name() == "UTF-8" {
        return None;
    }
    match decode(body, encoding) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(encoding = encoding.name(), "falling back to lossy UTF-8: {e}");
            None
        }
    }
}

/// Parse XML text. `file_name` is recorded in the header as-is.
pub fn parse_str(
    xml: &str,
    file_name: &str,
    config: &ParserConfig,
) -> Result<DocumentRecord, DianError> {
    let doc = XmlDocument::parse(xml, config.recover)?;
    Ok(extract_record(&doc, file_name, config))
}

/// Run the extraction pipeline over an already-parsed tree.
pub fn extract_record(doc: &XmlDocument, file_name: &str, config: &ParserConfig) -> DocumentRecord {
    let acc = FieldAccessor::new(doc, &config.namespaces);
    let root_tag = doc.local_name(doc.root()).to_string();
    let layout = DocumentLayout::for_root_tag(&root_tag);

    let record = DocumentRecord {
        header: extract_header(&acc, &root_tag, layout.kind, file_name),
        issuer: resolve_party(&acc, &layout, PartyRole::Issuer),
        recipient: resolve_party(&acc, &layout, PartyRole::Recipient),
        payment: resolve_payment(&acc),
        totals: resolve_totals(&acc, &layout),
        taxes: document_taxes(&acc),
        withholdings: document_withholdings(&acc),
        sector_fields: extract_sector_fields(&acc),
        items: extract_lines(&acc, &layout),
    };

    debug!(
        file = file_name,
        kind = ?layout.kind,
        number = %record.header.number,
        lines = record.items.len(),
        tax_entries = record.taxes.len(),
        "parsed document"
    );
    record
}

fn extract_header(
    acc: &FieldAccessor<'_>,
    root_tag: &str,
    kind: DocumentKind,
    file_name: &str,
) -> Header {
    let root = acc.root();
    let field = |tag: &str| acc.text(root, &format!("//cbc:{tag}"));
    Header {
        document_type: root_tag.to_string(),
        label: kind.label().to_string(),
        ubl_version: field("UBLVersionID"),
        customization_id: field("CustomizationID"),
        profile_id: field("ProfileID"),
        profile_execution_id: field("ProfileExecutionID"),
        number: field("ID"),
        cufe: field("UUID"),
        issue_date: field("IssueDate"),
        issue_time: field("IssueTime"),
        due_date: field("DueDate"),
        type_code: FallbackChain::new()
            .or(|| field("InvoiceTypeCode"))
            .or(|| field("CreditNoteTypeCode"))
            .or(|| field("DebitNoteTypeCode"))
            .resolve(),
        currency: field("DocumentCurrencyCode"),
        note: field("Note"),
        line_count: field("LineCountNumeric"),
        file_name: file_name.to_string(),
    }
}
