#![no_main]

use libfuzzer_sys::fuzz_target;
use superfacturas::core::Namespaces;
use superfacturas::xml::{Query, XmlDocument};

const DOC: &str = r#"<Invoice xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2" xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2"><cbc:ID>1</cbc:ID><cac:InvoiceLine><cbc:ID>1</cbc:ID><cbc:InvoicedQuantity unitCode="94">2</cbc:InvoicedQuantity></cac:InvoiceLine></Invoice>"#;

fuzz_target!(|data: &[u8]| {
    if let Ok(path) = std::str::from_utf8(data) {
        if let Ok(query) = Query::compile(path, &Namespaces::dian()) {
            if let Ok(doc) = XmlDocument::parse(DOC, false) {
                let _ = query.select(&doc, doc.root());
            }
        }
    }
});
