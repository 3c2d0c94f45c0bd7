//! Customer and delivery-address records collected at checkout.
//!
//! These are flat, string-keyed records filled from a form. They are not
//! persisted beyond the current order composition, except for the best-effort
//! form draft ([`CheckoutForm`]) cached so a reload does not lose the
//! customer's typing. Draft caching must never block order submission.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::storage::KeyValueStorage;
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Customer {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 7, message = "invalid phone number"))]
    pub phone: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, message = "emirate is required"))]
    pub emirate: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "street address is required"))]
    pub street: String,
    /// Optional; rendered in the order message only when non-empty.
    #[serde(default)]
    pub postal_code: String,
}

/// Validates the checkout pair, collapsing field errors into one message.
pub fn validate_checkout(customer: &Customer, address: &Address) -> Result<()> {
    customer
        .validate()
        .and_then(|()| address.validate())
        .map_err(|errors| StorefrontError::Validation(errors.to_string()))
}

/// Partially-filled checkout form, cached between page loads for convenience.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub notes: String,
}

impl CheckoutForm {
    /// Loads a cached draft; a missing or corrupt draft is just a blank form.
    pub fn load_draft<S: KeyValueStorage>(storage: &S, key: &str) -> Self {
        let Some(raw) = storage.get(key) else {
            return Self::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(%key, %err, "discarding corrupt checkout draft");
            Self::default()
        })
    }

    /// Best-effort save; failures are logged and swallowed.
    pub fn save_draft<S: KeyValueStorage>(&self, storage: &mut S, key: &str) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(err) = storage.set(key, &json) {
                    tracing::warn!(%key, %err, "checkout draft not persisted");
                }
            }
            Err(err) => tracing::warn!(%err, "checkout draft not serializable"),
        }
    }

    pub fn discard<S: KeyValueStorage>(storage: &mut S, key: &str) {
        storage.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn customer() -> Customer {
        Customer {
            first_name: "Sara".into(),
            last_name: "Ahmed".into(),
            email: "sara@example.com".into(),
            phone: "+971501234567".into(),
        }
    }

    fn address() -> Address {
        Address {
            emirate: "Dubai".into(),
            city: "Dubai".into(),
            street: "Al Wasl Road 12".into(),
            postal_code: String::new(),
        }
    }

    #[test]
    fn test_valid_checkout_passes() {
        assert!(validate_checkout(&customer(), &address()).is_ok());
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut c = customer();
        c.email = "not-an-email".into();
        let err = validate_checkout(&c, &address()).unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
    }

    #[test]
    fn test_missing_street_is_rejected() {
        let mut a = address();
        a.street.clear();
        assert!(validate_checkout(&customer(), &a).is_err());
    }

    #[test]
    fn test_draft_round_trip() {
        let mut storage = MemoryStorage::new();
        let draft = CheckoutForm { customer: customer(), address: address(), notes: "gift wrap".into() };
        draft.save_draft(&mut storage, "draft");
        assert_eq!(CheckoutForm::load_draft(&storage, "draft"), draft);
    }

    #[test]
    fn test_corrupt_draft_loads_blank() {
        let mut storage = MemoryStorage::new();
        storage.set("draft", "{{{").unwrap();
        assert_eq!(CheckoutForm::load_draft(&storage, "draft"), CheckoutForm::default());
    }

    #[test]
    fn test_draft_save_failure_is_swallowed() {
        let mut storage = MemoryStorage::new();
        storage.set_available(false);
        CheckoutForm::default().save_draft(&mut storage, "draft");
        storage.set_available(true);
        assert_eq!(CheckoutForm::load_draft(&storage, "draft"), CheckoutForm::default());
    }
}
