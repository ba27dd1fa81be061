//! The alias dictionary: accepted header spellings per canonical field.

use std::collections::HashMap;

use crate::config::AliasOverrides;
use crate::models::CanonicalField;

/// Built-in header spellings, abbreviations and synonyms for a field.
fn builtin_aliases(field: CanonicalField) -> &'static [&'static str] {
    match field {
        CanonicalField::EmployeeNumber => &[
            "employee number",
            "employee no",
            "employee no.",
            "emp no",
            "emp. no",
            "emp_no",
            "staff no",
            "staff number",
            "payroll no",
            "payroll number",
            "employee id",
            "emp id",
            "staff id",
            "personnel number",
            "pf no",
            "pf number",
        ],
        CanonicalField::FullName => &[
            "name",
            "names",
            "full name",
            "full names",
            "employee name",
            "staff name",
            "employee",
        ],
        CanonicalField::Surname => &["surname", "last name", "lastname", "family name"],
        CanonicalField::GivenNames => &[
            "first name",
            "firstname",
            "first names",
            "given names",
            "given name",
            "other names",
            "othernames",
            "forename",
            "forenames",
        ],
        CanonicalField::NationalId => &[
            "id",
            "id no",
            "id number",
            "id/passport",
            "national id",
            "national id no",
            "national id number",
            "passport number",
        ],
        CanonicalField::TaxPin => &[
            "kra pin",
            "kra pin no",
            "kra pin number",
            "pin",
            "pin no",
            "pin number",
            "tax pin",
            "tax id",
        ],
        CanonicalField::PensionNumber => &[
            "nssf no",
            "nssf number",
            "nssf member no",
            "nssf membership number",
            "pension number",
            "pension no",
        ],
        CanonicalField::HealthNumber => &[
            "nhif no",
            "nhif number",
            "nhif membership number",
            "shif no",
            "shif number",
            "sha number",
            "health insurance number",
        ],
        CanonicalField::Position => &[
            "position",
            "job position",
            "designation",
            "job title",
            "title",
            "role",
        ],
        CanonicalField::GrossIncome => &[
            "gross",
            "gross pay",
            "gross salary",
            "gross income",
            "gross earnings",
            "basic pay",
            "basic salary",
            "salary",
            "total earnings",
        ],
        CanonicalField::StatutoryTax => &["paye", "p.a.y.e", "paye tax", "income tax", "tax"],
        CanonicalField::StatutoryPension => &[
            "nssf",
            "nssf deduction",
            "nssf contribution",
            "pension",
            "pension contribution",
        ],
        CanonicalField::StatutoryHealth => &[
            "nhif",
            "shif",
            "sha",
            "nhif deduction",
            "shif deduction",
            "health insurance",
        ],
        CanonicalField::StatutoryLevy => &[
            "housing levy",
            "ahl",
            "affordable housing levy",
            "housing",
            "levy",
        ],
        CanonicalField::LoanDeduction => &[
            "loan",
            "loans",
            "loan deduction",
            "loan repayment",
            "helb",
        ],
        CanonicalField::EmployerAdvance => &[
            "advance",
            "advances",
            "salary advance",
            "employer advance",
        ],
        CanonicalField::OtherDeductions => &[
            "other deductions",
            "sacco",
            "welfare",
            "union dues",
        ],
        CanonicalField::TotalDeductions => &["total deductions", "total deduction", "deductions"],
        CanonicalField::NetIncome => &[
            "net",
            "net pay",
            "net salary",
            "net income",
            "netpay",
            "take home",
            "take home pay",
        ],
        CanonicalField::AdvanceLimit => &["advance limit", "ewa limit"],
        CanonicalField::PhoneNumber => &[
            "phone",
            "phone no",
            "phone number",
            "mobile",
            "mobile no",
            "mobile number",
            "telephone",
            "tel",
            "msisdn",
        ],
        CanonicalField::Email => &["email", "e-mail", "email address", "mail"],
        CanonicalField::BankAccount => &[
            "account number",
            "account no",
            "acc no",
            "a/c no",
            "bank account",
            "bank account number",
        ],
        CanonicalField::BankName => &["bank", "bank name"],
        CanonicalField::Gender => &["gender", "sex"],
        CanonicalField::OnProbation => &["probation", "on probation", "probation status"],
        CanonicalField::TermsAccepted => &["terms accepted", "accepted terms", "terms"],
        CanonicalField::Status => &["status", "employment status", "employee status"],
    }
}

/// Lowercases, trims and collapses internal whitespace.
pub(crate) fn normalize_label(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Accepted header spellings for every canonical field.
///
/// Aliases are stored normalized (lowercase, single-spaced). Each field's
/// list always starts with its own canonical name.
///
/// # Example
///
/// ```
/// use payroll_ingest::ingest::AliasSet;
/// use payroll_ingest::models::CanonicalField;
///
/// let aliases = AliasSet::builtin();
/// assert_eq!(aliases.aliases(CanonicalField::TaxPin)[0], "tax_pin");
/// assert!(aliases.is_known_alias("KRA PIN"));
/// ```
#[derive(Debug, Clone)]
pub struct AliasSet {
    aliases: HashMap<CanonicalField, Vec<String>>,
}

impl AliasSet {
    /// The built-in dictionary.
    pub fn builtin() -> Self {
        let aliases = CanonicalField::ALL
            .into_iter()
            .map(|field| {
                let mut list = vec![field.name().to_string()];
                for alias in builtin_aliases(field) {
                    push_unique(&mut list, alias);
                }
                (field, list)
            })
            .collect();
        Self { aliases }
    }

    /// Appends extra aliases after the existing ones.
    pub fn with_overrides(mut self, overrides: &AliasOverrides) -> Self {
        for (field, extra) in overrides {
            let list = self.aliases.entry(*field).or_default();
            for alias in extra {
                push_unique(list, alias);
            }
        }
        self
    }

    /// The aliases of a field, canonical name first.
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `text` equals any field's canonical name or alias,
    /// ignoring case and surrounding whitespace.
    pub fn is_known_alias(&self, text: &str) -> bool {
        let label = normalize_label(text);
        !label.is_empty() && self.aliases.values().flatten().any(|alias| *alias == label)
    }

    /// Returns true if `text` textually overlaps a canonical name or alias.
    ///
    /// Used to spot header rows embedded among data rows. Overlap is exact
    /// equality, or whole-word containment in either direction where the
    /// contained side is at least four characters long. Text containing
    /// digits never resembles a field name.
    pub fn resembles_field_name(&self, text: &str) -> bool {
        let label = normalize_label(text);
        if label.is_empty() || label.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        let padded_label = format!(" {} ", label);
        self.aliases.values().flatten().any(|alias| {
            *alias == label
                || (alias.len() >= 4 && padded_label.contains(&format!(" {} ", alias)))
                || (label.len() >= 4 && format!(" {} ", alias).contains(&padded_label))
        })
    }
}

impl Default for AliasSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn push_unique(list: &mut Vec<String>, alias: &str) {
    let label = normalize_label(alias);
    if !label.is_empty() && !list.contains(&label) {
        list.push(label);
    }
}
