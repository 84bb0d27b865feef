//! The example customer record and its sealed counterpart.

use std::fs;

use anyhow::{Context, Result};
use cryptostruct::{CipherLeaf, CryptoContext, Opener, Record, SealedRecord, Sealer, Shape};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub account_id: i64,
    pub tier: String,
    pub contact: Contact,
    pub preferences: Vec<Preference>,
    pub login_counts: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedCustomer {
    pub crypto: CryptoContext,
    pub name: CipherLeaf,
    pub account_id: CipherLeaf,
    pub tier: String,
    pub contact: SealedContact,
    pub preferences: Vec<SealedPreference>,
    pub login_counts: Vec<CipherLeaf>,
}

impl Record for Customer {
    type Sealed = SealedCustomer;

    fn shape() -> Shape {
        Shape::builder("Customer")
            .scalar::<String>("name")
            .sensitive(true)
            .scalar::<i64>("account_id")
            .sensitive(true)
            .scalar::<String>("tier")
            .sensitive(false)
            .record::<Contact>("contact")
            .sensitive(true)
            .records::<Preference>("preferences")
            .sensitive(true)
            .scalars::<u16>("login_counts")
            .sensitive(true)
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> cryptostruct::Result<SealedCustomer> {
        Ok(SealedCustomer {
            crypto: sealer.context(),
            name: sealer.scalar("name", &self.name)?,
            account_id: sealer.scalar("account_id", &self.account_id)?,
            tier: sealer.pass("tier", &self.tier)?,
            contact: sealer.record("contact", &self.contact)?,
            preferences: sealer.records("preferences", &self.preferences)?,
            login_counts: sealer.scalars("login_counts", &self.login_counts)?,
        })
    }
}

impl SealedRecord for SealedCustomer {
    type Open = Customer;

    fn shape() -> Shape {
        Shape::builder("SealedCustomer")
            .context("crypto")
            .leaf("name")
            .leaf("account_id")
            .scalar::<String>("tier")
            .sealed::<Contact>("contact")
            .sealed_seq::<Preference>("preferences")
            .leaves("login_counts")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> cryptostruct::Result<Customer> {
        Ok(Customer {
            name: opener.scalar("name", &self.name)?,
            account_id: opener.scalar("account_id", &self.account_id)?,
            tier: opener.pass("tier", &self.tier)?,
            contact: opener.record("contact", &self.contact)?,
            preferences: opener.records("preferences", &self.preferences)?,
            login_counts: opener.scalars("login_counts", &self.login_counts)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedContact {
    pub crypto: CryptoContext,
    pub email: CipherLeaf,
    pub phone: CipherLeaf,
    pub country: String,
}

impl Record for Contact {
    type Sealed = SealedContact;

    fn shape() -> Shape {
        Shape::builder("Contact")
            .scalar::<String>("email")
            .sensitive(true)
            .scalar::<String>("phone")
            .sensitive(true)
            .scalar::<String>("country")
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> cryptostruct::Result<SealedContact> {
        Ok(SealedContact {
            crypto: sealer.context(),
            email: sealer.scalar("email", &self.email)?,
            phone: sealer.scalar("phone", &self.phone)?,
            country: sealer.pass("country", &self.country)?,
        })
    }
}

impl SealedRecord for SealedContact {
    type Open = Contact;

    fn shape() -> Shape {
        Shape::builder("SealedContact")
            .context("crypto")
            .leaf("email")
            .leaf("phone")
            .scalar::<String>("country")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> cryptostruct::Result<Contact> {
        Ok(Contact {
            email: opener.scalar("email", &self.email)?,
            phone: opener.scalar("phone", &self.phone)?,
            country: opener.pass("country", &self.country)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Preference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub topic: String,
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPreference {
    pub crypto: CryptoContext,
    pub topic: CipherLeaf,
    pub priority: u8,
}

impl Record for Preference {
    type Sealed = SealedPreference;

    fn shape() -> Shape {
        Shape::builder("Preference")
            .scalar::<String>("topic")
            .sensitive(true)
            .scalar::<u8>("priority")
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> cryptostruct::Result<SealedPreference> {
        Ok(SealedPreference {
            crypto: sealer.context(),
            topic: sealer.scalar("topic", &self.topic)?,
            priority: sealer.pass("priority", &self.priority)?,
        })
    }
}

impl SealedRecord for SealedPreference {
    type Open = Preference;

    fn shape() -> Shape {
        Shape::builder("SealedPreference")
            .context("crypto")
            .leaf("topic")
            .scalar::<u8>("priority")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> cryptostruct::Result<Preference> {
        Ok(Preference {
            topic: opener.scalar("topic", &self.topic)?,
            priority: opener.pass("priority", &self.priority)?,
        })
    }
}

/// The built-in example customer.
pub fn sample() -> Customer {
    Customer {
        name: "Grace Hopper".into(),
        account_id: 19_061_209,
        tier: "gold".into(),
        contact: Contact {
            email: "grace@example.com".into(),
            phone: "+1 555 0100".into(),
            country: "US".into(),
        },
        preferences: vec![
            Preference {
                topic: "compilers".into(),
                priority: 1,
            },
            Preference {
                topic: "navy".into(),
                priority: 2,
            },
        ],
        login_counts: vec![12, 0, 41],
    }
}

/// Read a customer record from a JSON file.
pub fn load(path: &str) -> Result<Customer> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("{path} is not a valid customer record"))
}
