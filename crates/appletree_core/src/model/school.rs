//! School domain model.
//!
//! # Responsibility
//! - Define the persisted school record shape.
//! - Provide creation and partial-update inputs used by the service layer.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `version` starts at 1 and only the store increments it.
//! - `mode` is semantically a small set; order is preserved as given.

use crate::validator::{
    len_between, matches, max_bytes, not_empty, unique, valid_website, Validator, EMAIL_RX,
    PHONE_RX,
};
use serde::{Deserialize, Serialize};

const MAX_SHORT_FIELD_BYTES: usize = 200;
const MAX_ADDRESS_BYTES: usize = 500;
const MIN_MODES: usize = 1;
const MAX_MODES: usize = 5;

/// Store-assigned school identifier.
pub type SchoolId = i64;

/// Canonical school record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    /// Zero until the record has been inserted.
    pub id: SchoolId,
    /// Unix epoch milliseconds. Internal bookkeeping, not exposed on the wire.
    #[serde(skip)]
    pub created_at: i64,
    pub name: String,
    pub level: String,
    pub contact: String,
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub website: String,
    pub address: String,
    /// Delivery modes, e.g. `online`, `in-person`.
    pub mode: Vec<String>,
    /// Optimistic-concurrency token.
    pub version: i32,
}

/// Input for creating a school. Store-owned fields are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchool {
    pub name: String,
    pub level: String,
    pub contact: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub mode: Vec<String>,
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolPatch {
    pub name: Option<String>,
    pub level: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub mode: Option<Vec<String>>,
}

impl School {
    /// Builds an unsaved record. `id` and `created_at` are zero until insert.
    pub fn new(input: NewSchool) -> Self {
        Self {
            id: 0,
            created_at: 0,
            name: input.name,
            level: input.level,
            contact: input.contact,
            phone: input.phone,
            email: input.email,
            website: input.website,
            address: input.address,
            mode: input.mode,
            version: 1,
        }
    }

    /// Returns whether the store has assigned an identity yet.
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }

    /// Overwrites the fields present in `patch`.
    pub fn apply(&mut self, patch: SchoolPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(contact) = patch.contact {
            self.contact = contact;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(website) = patch.website {
            self.website = website;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
    }
}

impl From<NewSchool> for School {
    fn from(value: NewSchool) -> Self {
        Self::new(value)
    }
}

impl SchoolPatch {
    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.level.is_none()
            && self.contact.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.website.is_none()
            && self.address.is_none()
            && self.mode.is_none()
    }
}

/// Runs every school field rule, recording one message per failing field.
pub fn validate_school(v: &mut Validator, school: &School) {
    for (key, value) in [
        ("name", &school.name),
        ("level", &school.level),
        ("contact", &school.contact),
    ] {
        v.check(not_empty(value), key, "must be provided");
        v.check(
            max_bytes(value, MAX_SHORT_FIELD_BYTES),
            key,
            "must not be more than 200 bytes long",
        );
    }

    v.check(not_empty(&school.phone), "phone", "must be provided");
    v.check(
        matches(&school.phone, &PHONE_RX),
        "phone",
        "must be a valid phone number",
    );

    v.check(not_empty(&school.email), "email", "must be provided");
    v.check(
        matches(&school.email, &EMAIL_RX),
        "email",
        "must be a valid email address",
    );

    v.check(not_empty(&school.website), "website", "must be provided");
    v.check(
        valid_website(&school.website),
        "website",
        "must be a valid URL",
    );

    v.check(not_empty(&school.address), "address", "must be provided");
    v.check(
        max_bytes(&school.address, MAX_ADDRESS_BYTES),
        "address",
        "must not be more than 500 bytes long",
    );

    v.check(!school.mode.is_empty(), "mode", "must be provided");
    v.check(
        len_between(&school.mode, MIN_MODES, MAX_MODES),
        "mode",
        "must contain between 1 and 5 entries",
    );
    v.check(
        unique(&school.mode),
        "mode",
        "must not contain duplicate entries",
    );
}
