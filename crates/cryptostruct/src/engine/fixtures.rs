//! Record types shared by the engine and cache tests.

use std::sync::atomic::{AtomicU64, Ordering};

use common::{CipherLeaf, CipherSuite, CryptoContext, Result};
use serde::{Deserialize, Serialize};

use super::{Opener, Sealer};
use crate::crypto::{RandomError, RandomSource};
use crate::record::{Record, SealedRecord};
use crate::schema::Shape;

// ---------------------------------------------------------------------------
// Person: every supported field kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    pub count: i64,
    pub note: String,
    pub details: Details,
    pub addresses: Vec<Address>,
    pub lucky_numbers: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedPerson {
    pub crypto: CryptoContext,
    pub name: CipherLeaf,
    pub count: CipherLeaf,
    pub note: String,
    pub details: SealedDetails,
    pub addresses: Vec<SealedAddress>,
    pub lucky_numbers: Vec<CipherLeaf>,
}

impl Record for Person {
    type Sealed = SealedPerson;

    fn shape() -> Shape {
        Shape::builder("Person")
            .scalar::<String>("name")
            .sensitive(true)
            .scalar::<i64>("count")
            .sensitive(true)
            .scalar::<String>("note")
            .record::<Details>("details")
            .sensitive(true)
            .records::<Address>("addresses")
            .sensitive(true)
            .scalars::<u32>("lucky_numbers")
            .sensitive(true)
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedPerson> {
        Ok(SealedPerson {
            crypto: sealer.context(),
            name: sealer.scalar("name", &self.name)?,
            count: sealer.scalar("count", &self.count)?,
            note: sealer.pass("note", &self.note)?,
            details: sealer.record("details", &self.details)?,
            addresses: sealer.records("addresses", &self.addresses)?,
            lucky_numbers: sealer.scalars("lucky_numbers", &self.lucky_numbers)?,
        })
    }
}

impl SealedRecord for SealedPerson {
    type Open = Person;

    fn shape() -> Shape {
        Shape::builder("SealedPerson")
            .context("crypto")
            .leaf("name")
            .leaf("count")
            .scalar::<String>("note")
            .sealed::<Details>("details")
            .sealed_seq::<Address>("addresses")
            .leaves("lucky_numbers")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Person> {
        Ok(Person {
            name: opener.scalar("name", &self.name)?,
            count: opener.scalar("count", &self.count)?,
            note: opener.pass("note", &self.note)?,
            details: opener.record("details", &self.details)?,
            addresses: opener.records("addresses", &self.addresses)?,
            lucky_numbers: opener.scalars("lucky_numbers", &self.lucky_numbers)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    pub first_name: String,
    pub last_name: String,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedDetails {
    pub crypto: CryptoContext,
    pub first_name: CipherLeaf,
    pub last_name: CipherLeaf,
    pub meta: Meta,
}

impl Record for Details {
    type Sealed = SealedDetails;

    fn shape() -> Shape {
        Shape::builder("Details")
            .scalar::<String>("first_name")
            .sensitive(true)
            .scalar::<String>("last_name")
            .sensitive(true)
            .record::<Meta>("meta")
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedDetails> {
        Ok(SealedDetails {
            crypto: sealer.context(),
            first_name: sealer.scalar("first_name", &self.first_name)?,
            last_name: sealer.scalar("last_name", &self.last_name)?,
            meta: sealer.pass("meta", &self.meta)?,
        })
    }
}

impl SealedRecord for SealedDetails {
    type Open = Details;

    fn shape() -> Shape {
        Shape::builder("SealedDetails")
            .context("crypto")
            .leaf("first_name")
            .leaf("last_name")
            .record::<Meta>("meta")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Details> {
        Ok(Details {
            first_name: opener.scalar("first_name", &self.first_name)?,
            last_name: opener.scalar("last_name", &self.last_name)?,
            meta: opener.pass("meta", &self.meta)?,
        })
    }
}

/// A record that is only ever passed through in these fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub source: String,
    pub revision: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedMeta {
    pub crypto: CryptoContext,
    pub source: CipherLeaf,
    pub revision: u16,
}

impl Record for Meta {
    type Sealed = SealedMeta;

    fn shape() -> Shape {
        Shape::builder("Meta")
            .scalar::<String>("source")
            .sensitive(true)
            .scalar::<u16>("revision")
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedMeta> {
        Ok(SealedMeta {
            crypto: sealer.context(),
            source: sealer.scalar("source", &self.source)?,
            revision: sealer.pass("revision", &self.revision)?,
        })
    }
}

impl SealedRecord for SealedMeta {
    type Open = Meta;

    fn shape() -> Shape {
        Shape::builder("SealedMeta")
            .context("crypto")
            .leaf("source")
            .scalar::<u16>("revision")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Meta> {
        Ok(Meta {
            source: opener.scalar("source", &self.source)?,
            revision: opener.pass("revision", &self.revision)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedAddress {
    pub crypto: CryptoContext,
    pub street: CipherLeaf,
    pub city: String,
    pub zip: CipherLeaf,
}

impl Record for Address {
    type Sealed = SealedAddress;

    fn shape() -> Shape {
        Shape::builder("Address")
            .scalar::<String>("street")
            .sensitive(true)
            .scalar::<String>("city")
            .scalar::<u32>("zip")
            .sensitive(true)
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedAddress> {
        Ok(SealedAddress {
            crypto: sealer.context(),
            street: sealer.scalar("street", &self.street)?,
            city: sealer.pass("city", &self.city)?,
            zip: sealer.scalar("zip", &self.zip)?,
        })
    }
}

impl SealedRecord for SealedAddress {
    type Open = Address;

    fn shape() -> Shape {
        Shape::builder("SealedAddress")
            .context("crypto")
            .leaf("street")
            .scalar::<String>("city")
            .leaf("zip")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Address> {
        Ok(Address {
            street: opener.scalar("street", &self.street)?,
            city: opener.pass("city", &self.city)?,
            zip: opener.scalar("zip", &self.zip)?,
        })
    }
}

pub fn person() -> Person {
    Person {
        name: "Ada Lovelace".into(),
        count: 7,
        note: "met at the conference".into(),
        details: Details {
            first_name: "Ada".into(),
            last_name: "King".into(),
            meta: Meta {
                source: "import".into(),
                revision: 3,
            },
        },
        addresses: vec![
            Address {
                street: "12 St James's Square".into(),
                city: "London".into(),
                zip: 10001,
            },
            Address {
                street: "Ockham Park".into(),
                city: "Surrey".into(),
                zip: 22023,
            },
        ],
        lucky_numbers: vec![3, 14, 15],
    }
}

// ---------------------------------------------------------------------------
// Sample: three fields, one nested record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub count: i64,
    pub sub: Sub,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSample {
    pub crypto: CryptoContext,
    pub name: CipherLeaf,
    pub count: CipherLeaf,
    pub sub: SealedSub,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sub {
    pub x: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSub {
    pub crypto: CryptoContext,
    pub x: CipherLeaf,
}

impl Record for Sample {
    type Sealed = SealedSample;

    fn shape() -> Shape {
        Shape::builder("Sample")
            .scalar::<String>("name")
            .sensitive(true)
            .scalar::<i64>("count")
            .sensitive(true)
            .record::<Sub>("sub")
            .sensitive(true)
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedSample> {
        Ok(SealedSample {
            crypto: sealer.context(),
            name: sealer.scalar("name", &self.name)?,
            count: sealer.scalar("count", &self.count)?,
            sub: sealer.record("sub", &self.sub)?,
        })
    }
}

impl SealedRecord for SealedSample {
    type Open = Sample;

    fn shape() -> Shape {
        Shape::builder("SealedSample")
            .context("crypto")
            .leaf("name")
            .leaf("count")
            .sealed::<Sub>("sub")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Sample> {
        Ok(Sample {
            name: opener.scalar("name", &self.name)?,
            count: opener.scalar("count", &self.count)?,
            sub: opener.record("sub", &self.sub)?,
        })
    }
}

impl Record for Sub {
    type Sealed = SealedSub;

    fn shape() -> Shape {
        Shape::builder("Sub")
            .scalar::<String>("x")
            .sensitive(true)
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedSub> {
        Ok(SealedSub {
            crypto: sealer.context(),
            x: sealer.scalar("x", &self.x)?,
        })
    }
}

impl SealedRecord for SealedSub {
    type Open = Sub;

    fn shape() -> Shape {
        Shape::builder("SealedSub").context("crypto").leaf("x").build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Sub> {
        Ok(Sub {
            x: opener.scalar("x", &self.x)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Broken declarations
// ---------------------------------------------------------------------------

/// Pass-through field declared with a different width on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drifted {
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedDrifted {
    pub crypto: CryptoContext,
    pub version: i64,
}

impl Record for Drifted {
    type Sealed = SealedDrifted;

    fn shape() -> Shape {
        Shape::builder("Drifted").scalar::<i64>("version").build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedDrifted> {
        Ok(SealedDrifted {
            crypto: sealer.context(),
            version: sealer.pass("version", &self.version)?,
        })
    }
}

impl SealedRecord for SealedDrifted {
    type Open = Drifted;

    fn shape() -> Shape {
        Shape::builder("SealedDrifted")
            .context("crypto")
            .scalar::<i32>("version")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Drifted> {
        Ok(Drifted {
            version: opener.pass("version", &self.version)?,
        })
    }
}

/// Field mapping that copies a field its shape tags sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Miswired {
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMiswired {
    pub crypto: CryptoContext,
    pub secret: CipherLeaf,
}

impl Record for Miswired {
    type Sealed = SealedMiswired;

    fn shape() -> Shape {
        Shape::builder("Miswired")
            .scalar::<String>("secret")
            .sensitive(true)
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedMiswired> {
        Ok(SealedMiswired {
            crypto: sealer.context(),
            secret: CipherLeaf::from_hex(sealer.pass("secret", &self.secret)?),
        })
    }
}

impl SealedRecord for SealedMiswired {
    type Open = Miswired;

    fn shape() -> Shape {
        Shape::builder("SealedMiswired")
            .context("crypto")
            .leaf("secret")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Miswired> {
        Ok(Miswired {
            secret: opener.pass("secret", &self.secret.to_string())?,
        })
    }
}

/// Sealed shape that never declares its context field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contextless {
    pub a: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedContextless {
    pub crypto: CryptoContext,
    pub a: String,
}

impl Record for Contextless {
    type Sealed = SealedContextless;

    fn shape() -> Shape {
        Shape::builder("Contextless").scalar::<String>("a").build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedContextless> {
        Ok(SealedContextless {
            crypto: sealer.context(),
            a: sealer.pass("a", &self.a)?,
        })
    }
}

impl SealedRecord for SealedContextless {
    type Open = Contextless;

    fn shape() -> Shape {
        Shape::builder("SealedContextless")
            .scalar::<String>("a")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Contextless> {
        Ok(Contextless {
            a: opener.pass("a", &self.a)?,
        })
    }
}

/// Field mapping that stamps a context of its own making.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unstamped {
    pub a: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedUnstamped {
    pub crypto: CryptoContext,
    pub a: String,
}

impl Record for Unstamped {
    type Sealed = SealedUnstamped;

    fn shape() -> Shape {
        Shape::builder("Unstamped").scalar::<String>("a").build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedUnstamped> {
        Ok(SealedUnstamped {
            crypto: CryptoContext {
                cipher_suite: CipherSuite::Aes256Gcm,
                salt: "00".repeat(32),
            },
            a: sealer.pass("a", &self.a)?,
        })
    }
}

impl SealedRecord for SealedUnstamped {
    type Open = Unstamped;

    fn shape() -> Shape {
        Shape::builder("SealedUnstamped")
            .context("crypto")
            .scalar::<String>("a")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Unstamped> {
        Ok(Unstamped {
            a: opener.pass("a", &self.a)?,
        })
    }
}

/// Field mapping that writes a sensitive field without the sealer and never
/// reads it back through the opener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaky {
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedLeaky {
    pub crypto: CryptoContext,
    pub secret: CipherLeaf,
}

impl Record for Leaky {
    type Sealed = SealedLeaky;

    fn shape() -> Shape {
        Shape::builder("Leaky")
            .scalar::<String>("secret")
            .sensitive(true)
            .build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedLeaky> {
        Ok(SealedLeaky {
            crypto: sealer.context(),
            secret: CipherLeaf::from_ciphertext(self.secret.as_bytes()),
        })
    }
}

impl SealedRecord for SealedLeaky {
    type Open = Leaky;

    fn shape() -> Shape {
        Shape::builder("SealedLeaky")
            .context("crypto")
            .leaf("secret")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, _opener: &Opener<'_>) -> Result<Leaky> {
        Ok(Leaky {
            secret: String::new(),
        })
    }
}

/// Field mapping that routes the same field through the sealer twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Echoed {
    pub a: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedEchoed {
    pub crypto: CryptoContext,
    pub a: String,
}

impl Record for Echoed {
    type Sealed = SealedEchoed;

    fn shape() -> Shape {
        Shape::builder("Echoed").scalar::<String>("a").build()
    }

    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedEchoed> {
        let first = sealer.pass("a", &self.a)?;
        Ok(SealedEchoed {
            crypto: sealer.context(),
            a: sealer.pass("a", &first)?,
        })
    }
}

impl SealedRecord for SealedEchoed {
    type Open = Echoed;

    fn shape() -> Shape {
        Shape::builder("SealedEchoed")
            .context("crypto")
            .scalar::<String>("a")
            .build()
    }

    fn crypto_context(&self) -> &CryptoContext {
        &self.crypto
    }

    fn open_fields(&self, opener: &Opener<'_>) -> Result<Echoed> {
        Ok(Echoed {
            a: opener.pass("a", &self.a)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Deterministic randomness
// ---------------------------------------------------------------------------

/// Fills every buffer with the call counter followed by a fixed pattern, so
/// two engines given the same sequence of calls produce identical output.
#[derive(Debug, Default)]
pub struct CountingRandom(AtomicU64);

impl RandomSource for CountingRandom {
    fn fill(&self, buf: &mut [u8]) -> std::result::Result<(), RandomError> {
        let n = self.0.fetch_add(1, Ordering::SeqCst).to_be_bytes();
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = n.get(i).copied().unwrap_or(0xA5);
        }
        Ok(())
    }
}
