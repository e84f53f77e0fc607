//! Tagged result returned by every repository operation.

use serde::ser::{Serialize, Serializer};

/// Generic reason used when a `Fail` is built from a blank message.
const FALLBACK_FAIL_REASON: &str = "요청을 처리할 수 없습니다.";

/// Outcome of one repository operation.
///
/// - `Success` carries freshly built output data.
/// - `Fail` carries a non-empty, user-facing reason.
/// - `Exception` never carries a reason; details live in the server log only.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Fail(String),
    Exception,
}

/// Wire tag of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    Success,
    Fail,
    Exception,
}

/// Flat `{ result, reason, data }` shape used when an outcome leaves the process.
#[derive(Debug, serde::Serialize)]
pub struct ResultEnvelope<'a, T> {
    pub result: ResultCode,
    pub reason: Option<&'a str>,
    pub data: Option<&'a T>,
}

impl<T> Outcome<T> {
    /// Builds a `Fail`, substituting a generic reason for blank messages.
    pub fn fail(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Self::Fail(FALLBACK_FAIL_REASON.to_string());
        }
        Self::Fail(reason)
    }

    pub fn code(&self) -> ResultCode {
        match self {
            Self::Success(_) => ResultCode::Success,
            Self::Fail(_) => ResultCode::Fail,
            Self::Exception => ResultCode::Exception,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the failure reason; always `None` for `Success` and `Exception`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Fail(reason) => Some(reason.as_str()),
            Self::Success(_) | Self::Exception => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Fail(_) | Self::Exception => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Fail(_) | Self::Exception => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(data) => Outcome::Success(f(data)),
            Self::Fail(reason) => Outcome::Fail(reason),
            Self::Exception => Outcome::Exception,
        }
    }

    pub fn to_envelope(&self) -> ResultEnvelope<'_, T> {
        ResultEnvelope {
            result: self.code(),
            reason: self.reason(),
            data: self.data(),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_envelope().serialize(serializer)
    }
}
