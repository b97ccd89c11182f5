//! Typed request binding and declarative validation.
//!
//! A route that declares a request type gets its body decoded and validated
//! *before* its handler runs. The handler signature takes the bound value by
//! value — there is no `any`, no downcast, and no way to observe a request
//! that failed a rule.
//!
//! Validation is a closed rule set applied field by field, in declaration
//! order, stopping at the first violation. Two rules exist today:
//! [`rules::numeric`] and [`rules::gt`].
//!
//! ```rust
//! use arbor::{Bind, Error, rules};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Signup {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Bind for Signup {
//!     fn validate(&self) -> Result<(), Error> {
//!         rules::numeric("age", self.age)?;
//!         rules::gt("age", self.age, 17)?;
//!         Ok(())
//!     }
//! }
//! ```

use serde::de::DeserializeOwned;

use crate::error::Error;

/// A request type a route can declare.
///
/// Implementations list their rules in [`validate`](Bind::validate) in field
/// order; the `?` chain makes "first violated rule wins" fall out of the
/// control flow. The default impl accepts everything the decoder accepts.
pub trait Bind: DeserializeOwned + Send + 'static {
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Decodes `body` into `T`, then applies `T`'s declared rules.
///
/// Pure: same bytes in, same result out, no global state touched. Decode
/// failures ([`Error::Decode`]) and rule failures ([`Error::Validation`])
/// both map to `400` at the dispatch boundary.
pub(crate) fn bind<T: Bind>(body: &[u8]) -> Result<T, Error> {
    let value: T = serde_json::from_slice(body)?;
    value.validate()?;
    Ok(value)
}

/// The closed validation rule set.
pub mod rules {
    use std::fmt::Display;

    use crate::error::Error;

    /// `numeric` — the value's canonical form must parse as a number.
    ///
    /// Trivially true for integer and float fields; it earns its keep on
    /// string fields that are numbers on the wire.
    pub fn numeric(field: &'static str, value: impl Display) -> Result<(), Error> {
        if value.to_string().parse::<f64>().is_ok() {
            Ok(())
        } else {
            Err(Error::Validation { field, rule: "numeric".to_owned() })
        }
    }

    /// `gt=N` — the value must be strictly greater than `bound`.
    pub fn gt<T>(field: &'static str, value: T, bound: T) -> Result<(), Error>
    where
        T: PartialOrd + Display,
    {
        if value > bound {
            Ok(())
        } else {
            Err(Error::Validation { field, rule: format!("gt={bound}") })
        }
    }
}
