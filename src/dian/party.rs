use super::accessor::FieldAccessor;
use super::fallback::FallbackChain;
use crate::core::{DocumentLayout, Party};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    Issuer,
    Recipient,
}

/// Resolve the issuer or recipient of the document described by `layout`.
pub fn resolve_party(acc: &FieldAccessor<'_>, layout: &DocumentLayout, role: PartyRole) -> Party {
    let base = match role {
        PartyRole::Issuer => layout.issuer_root,
        PartyRole::Recipient => layout.recipient_root,
    };
    let root = acc.root();
    let field = |rel: &str| acc.text(root, &format!("{base}{rel}"));

    let tax_id = FallbackChain::new()
        .or(|| field("//cbc:CompanyID"))
        .or(|| field("//cbc:ID"))
        .resolve();

    // Employees carry a person name instead of a registration name.
    let person_name = role == PartyRole::Recipient && layout.kind.is_payroll();
    let name = FallbackChain::new()
        .or(|| field("//cac:PartyName/cbc:Name"))
        .or(|| field("//cbc:RegistrationName"))
        .or_if(person_name, || {
            format!("{} {}", field("//cbc:FirstName"), field("//cbc:FamilyName"))
        })
        .resolve();

    Party {
        tax_id,
        name,
        tax_level_code: field("//cbc:TaxLevelCode"),
        city: field("//cbc:CityName"),
        region: field("//cbc:CountrySubentity"),
        address: field("//cac:AddressLine/cbc:Line"),
        email: field("//cbc:ElectronicMail"),
    }
}
