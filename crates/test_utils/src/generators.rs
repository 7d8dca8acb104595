//! Fake-data generators
//!
//! Randomized but shape-valid data for tests that want volume rather than
//! fixed fixtures.

use fake::faker::company::en::CompanyName;
use fake::Fake;

use domain_charges::ContainerNumber;

/// BIC owner codes seen at the terminal
const OWNER_CODES: &[&str] = &["MSKU", "TGHU", "MSCU", "CMAU", "HLXU", "OOLU"];

/// A random company display name
pub fn company_name() -> String {
    CompanyName().fake()
}

/// A random shape-valid container number
pub fn container_number() -> ContainerNumber {
    let owner = OWNER_CODES[(0..OWNER_CODES.len()).fake::<usize>()];
    let serial: u32 = (0u32..10_000_000).fake();
    ContainerNumber::new(format!("{owner}{serial:07}")).expect("generated numbers are shape-valid")
}

/// A random service description
pub fn service_description() -> String {
    const SERVICES: &[&str] = &[
        "Crane lift",
        "Weighing",
        "Customs inspection handling",
        "Reefer power connection",
        "Container repair",
    ];
    SERVICES[(0..SERVICES.len()).fake::<usize>()].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_container_numbers_are_valid() {
        for _ in 0..100 {
            let number = container_number();
            assert_eq!(number.as_str().len(), 11);
        }
    }
}
