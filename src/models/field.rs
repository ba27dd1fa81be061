//! Canonical payroll fields and where they land in an [`EmployeeRecord`].
//!
//! Every column the pipeline can recognise maps onto exactly one
//! [`CanonicalField`]. The field's [`FieldTarget`] describes the slot it fills,
//! either directly on the record or inside one of the nested groups, and its
//! [`FieldKind`] decides how raw cell text is coerced.
//!
//! [`EmployeeRecord`]: super::EmployeeRecord

use serde::{Deserialize, Serialize};

/// A normalized target attribute of an employee payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    /// Employer-assigned staff or payroll number.
    EmployeeNumber,
    /// A single column holding the whole name, split into given names and surname.
    FullName,
    /// Family name.
    Surname,
    /// First and middle names.
    GivenNames,
    /// National identity card or passport number.
    NationalId,
    /// Revenue authority personal identification number.
    TaxPin,
    /// Pension fund membership number.
    PensionNumber,
    /// Health insurance fund membership number.
    HealthNumber,
    /// Job position or title.
    Position,
    /// Gross pay before deductions.
    GrossIncome,
    /// Statutory income tax withheld.
    StatutoryTax,
    /// Statutory pension contribution.
    StatutoryPension,
    /// Statutory health insurance contribution.
    StatutoryHealth,
    /// Statutory housing levy.
    StatutoryLevy,
    /// Loan repayment deducted from pay.
    LoanDeduction,
    /// Salary advance recovered by the employer.
    EmployerAdvance,
    /// Any other deduction (sacco, welfare, union dues).
    OtherDeductions,
    /// Sum of all deductions as reported by the source.
    TotalDeductions,
    /// Net pay.
    NetIncome,
    /// Earned-wage advance limit.
    AdvanceLimit,
    /// Contact phone number.
    PhoneNumber,
    /// Contact email address.
    Email,
    /// Bank account number.
    BankAccount,
    /// Bank name.
    BankName,
    /// Gender as written in the source.
    Gender,
    /// Whether the employee is on probation.
    OnProbation,
    /// Whether the employee accepted the service terms.
    TermsAccepted,
    /// Employment status.
    Status,
}

/// How a raw cell is coerced before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed free text.
    Text,
    /// A full name split on whitespace into given names and surname.
    PersonName,
    /// A monetary amount; unparseable values default to zero.
    Money,
    /// A boolean flag; `true`, `yes` and `1` are true.
    Flag,
}

/// A nested group of related fields on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    /// Statutory deductions, reported together as one sub-aggregate.
    StatutoryDeductions,
    /// Contact details.
    Contact,
    /// Bank details.
    BankInfo,
}

impl FieldGroup {
    /// The serialized key of the group on an employee record.
    pub fn key(self) -> &'static str {
        match self {
            FieldGroup::StatutoryDeductions => "statutoryDeductions",
            FieldGroup::Contact => "contact",
            FieldGroup::BankInfo => "bankInfo",
        }
    }
}

/// The slot a canonical field fills on an employee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    /// A top-level attribute.
    Simple {
        /// Serialized attribute key.
        key: &'static str,
    },
    /// An attribute inside a nested group.
    Nested {
        /// The enclosing group.
        group: FieldGroup,
        /// Serialized attribute key within the group.
        key: &'static str,
    },
    /// Fills both the given names and the surname.
    NameSplit,
}

impl CanonicalField {
    /// Every canonical field, in resolution priority order.
    pub const ALL: [CanonicalField; 28] = [
        CanonicalField::EmployeeNumber,
        CanonicalField::FullName,
        CanonicalField::Surname,
        CanonicalField::GivenNames,
        CanonicalField::NationalId,
        CanonicalField::TaxPin,
        CanonicalField::PensionNumber,
        CanonicalField::HealthNumber,
        CanonicalField::Position,
        CanonicalField::GrossIncome,
        CanonicalField::StatutoryTax,
        CanonicalField::StatutoryPension,
        CanonicalField::StatutoryHealth,
        CanonicalField::StatutoryLevy,
        CanonicalField::LoanDeduction,
        CanonicalField::EmployerAdvance,
        CanonicalField::OtherDeductions,
        CanonicalField::TotalDeductions,
        CanonicalField::NetIncome,
        CanonicalField::AdvanceLimit,
        CanonicalField::PhoneNumber,
        CanonicalField::Email,
        CanonicalField::BankAccount,
        CanonicalField::BankName,
        CanonicalField::Gender,
        CanonicalField::OnProbation,
        CanonicalField::TermsAccepted,
        CanonicalField::Status,
    ];

    /// The canonical name, as used for header matching.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_ingest::models::CanonicalField;
    ///
    /// assert_eq!(CanonicalField::GrossIncome.name(), "gross_income");
    /// ```
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::EmployeeNumber => "employee_number",
            CanonicalField::FullName => "full_name",
            CanonicalField::Surname => "surname",
            CanonicalField::GivenNames => "given_names",
            CanonicalField::NationalId => "national_id",
            CanonicalField::TaxPin => "tax_pin",
            CanonicalField::PensionNumber => "pension_number",
            CanonicalField::HealthNumber => "health_number",
            CanonicalField::Position => "position",
            CanonicalField::GrossIncome => "gross_income",
            CanonicalField::StatutoryTax => "tax",
            CanonicalField::StatutoryPension => "pension",
            CanonicalField::StatutoryHealth => "health",
            CanonicalField::StatutoryLevy => "housing_levy",
            CanonicalField::LoanDeduction => "loan_deduction",
            CanonicalField::EmployerAdvance => "employer_advance",
            CanonicalField::OtherDeductions => "other_deductions",
            CanonicalField::TotalDeductions => "total_deductions",
            CanonicalField::NetIncome => "net_income",
            CanonicalField::AdvanceLimit => "advance_limit",
            CanonicalField::PhoneNumber => "phone_number",
            CanonicalField::Email => "email",
            CanonicalField::BankAccount => "bank_account",
            CanonicalField::BankName => "bank_name",
            CanonicalField::Gender => "gender",
            CanonicalField::OnProbation => "probation",
            CanonicalField::TermsAccepted => "terms_accepted",
            CanonicalField::Status => "status",
        }
    }

    /// How cells mapped to this field are coerced.
    pub fn kind(self) -> FieldKind {
        match self {
            CanonicalField::FullName => FieldKind::PersonName,
            CanonicalField::GrossIncome
            | CanonicalField::StatutoryTax
            | CanonicalField::StatutoryPension
            | CanonicalField::StatutoryHealth
            | CanonicalField::StatutoryLevy
            | CanonicalField::LoanDeduction
            | CanonicalField::EmployerAdvance
            | CanonicalField::OtherDeductions
            | CanonicalField::TotalDeductions
            | CanonicalField::NetIncome
            | CanonicalField::AdvanceLimit => FieldKind::Money,
            CanonicalField::OnProbation | CanonicalField::TermsAccepted => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }

    /// The record slot this field fills.
    pub fn target(self) -> FieldTarget {
        use FieldTarget::{NameSplit, Nested, Simple};

        match self {
            CanonicalField::FullName => NameSplit,
            CanonicalField::StatutoryTax => Nested {
                group: FieldGroup::StatutoryDeductions,
                key: "tax",
            },
            CanonicalField::StatutoryPension => Nested {
                group: FieldGroup::StatutoryDeductions,
                key: "pension",
            },
            CanonicalField::StatutoryHealth => Nested {
                group: FieldGroup::StatutoryDeductions,
                key: "health",
            },
            CanonicalField::StatutoryLevy => Nested {
                group: FieldGroup::StatutoryDeductions,
                key: "housingLevy",
            },
            CanonicalField::PhoneNumber => Nested {
                group: FieldGroup::Contact,
                key: "phoneNumber",
            },
            CanonicalField::Email => Nested {
                group: FieldGroup::Contact,
                key: "email",
            },
            CanonicalField::BankAccount => Nested {
                group: FieldGroup::BankInfo,
                key: "accountNumber",
            },
            CanonicalField::BankName => Nested {
                group: FieldGroup::BankInfo,
                key: "bankName",
            },
            CanonicalField::EmployeeNumber => Simple { key: "employeeNumber" },
            CanonicalField::Surname => Simple { key: "surname" },
            CanonicalField::GivenNames => Simple { key: "givenNames" },
            CanonicalField::NationalId => Simple { key: "nationalId" },
            CanonicalField::TaxPin => Simple { key: "taxPin" },
            CanonicalField::PensionNumber => Simple { key: "pensionNumber" },
            CanonicalField::HealthNumber => Simple { key: "healthNumber" },
            CanonicalField::Position => Simple { key: "position" },
            CanonicalField::GrossIncome => Simple { key: "grossIncome" },
            CanonicalField::LoanDeduction => Simple { key: "loanDeduction" },
            CanonicalField::EmployerAdvance => Simple { key: "employerAdvance" },
            CanonicalField::OtherDeductions => Simple { key: "otherDeductions" },
            CanonicalField::TotalDeductions => Simple { key: "totalDeductions" },
            CanonicalField::NetIncome => Simple { key: "netIncome" },
            CanonicalField::AdvanceLimit => Simple { key: "advanceLimit" },
            CanonicalField::Gender => Simple { key: "gender" },
            CanonicalField::OnProbation => Simple { key: "onProbation" },
            CanonicalField::TermsAccepted => Simple { key: "termsAccepted" },
            CanonicalField::Status => Simple { key: "status" },
        }
    }

    /// The dotted path of the field's slot in a serialized record.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_ingest::models::CanonicalField;
    ///
    /// assert_eq!(CanonicalField::StatutoryPension.path(), "statutoryDeductions.pension");
    /// assert_eq!(CanonicalField::GrossIncome.path(), "grossIncome");
    /// ```
    pub fn path(self) -> String {
        match self.target() {
            FieldTarget::Simple { key } => key.to_string(),
            FieldTarget::Nested { group, key } => format!("{}.{}", group.key(), key),
            FieldTarget::NameSplit => "givenNames+surname".to_string(),
        }
    }

    /// Returns true for the fields that can establish who a record belongs to.
    pub fn is_identity(self) -> bool {
        matches!(
            self,
            CanonicalField::EmployeeNumber
                | CanonicalField::FullName
                | CanonicalField::Surname
                | CanonicalField::GivenNames
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_canonical_names_are_unique() {
        let names: HashSet<&str> = CanonicalField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), CanonicalField::ALL.len());
    }

    #[test]
    fn test_all_lists_each_field_once() {
        let fields: HashSet<CanonicalField> = CanonicalField::ALL.into_iter().collect();
        assert_eq!(fields.len(), CanonicalField::ALL.len());
    }

    #[test]
    fn test_statutory_fields_are_nested() {
        for field in [
            CanonicalField::StatutoryTax,
            CanonicalField::StatutoryPension,
            CanonicalField::StatutoryHealth,
            CanonicalField::StatutoryLevy,
        ] {
            match field.target() {
                FieldTarget::Nested { group, .. } => {
                    assert_eq!(group, FieldGroup::StatutoryDeductions)
                }
                other => panic!("expected nested target for {:?}, got {:?}", field, other),
            }
            assert_eq!(field.kind(), FieldKind::Money);
        }
    }

    #[test]
    fn test_contact_and_bank_paths() {
        assert_eq!(CanonicalField::PhoneNumber.path(), "contact.phoneNumber");
        assert_eq!(CanonicalField::BankAccount.path(), "bankInfo.accountNumber");
        assert_eq!(CanonicalField::BankName.path(), "bankInfo.bankName");
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(CanonicalField::FullName.kind(), FieldKind::PersonName);
        assert_eq!(CanonicalField::OnProbation.kind(), FieldKind::Flag);
        assert_eq!(CanonicalField::TaxPin.kind(), FieldKind::Text);
        assert_eq!(CanonicalField::NetIncome.kind(), FieldKind::Money);
    }

    #[test]
    fn test_identity_fields() {
        assert!(CanonicalField::EmployeeNumber.is_identity());
        assert!(CanonicalField::FullName.is_identity());
        assert!(!CanonicalField::NationalId.is_identity());
    }

    #[test]
    fn test_field_serialization() {
        assert_eq!(
            serde_json::to_string(&CanonicalField::StatutoryLevy).unwrap(),
            "\"statutory_levy\""
        );
        let field: CanonicalField = serde_json::from_str("\"tax_pin\"").unwrap();
        assert_eq!(field, CanonicalField::TaxPin);
    }
}
