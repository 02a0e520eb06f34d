use crate::{
    Result,
    constants::{TICKET_MAX_WIDTH, TICKET_MIN_WIDTH, TICKET_TRUNCATED_WIDTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket identifier assigned by the queue server.
///
/// The value is an opaque token. It is numeric in practice, but nothing in
/// the station interprets it beyond rendering it on the indicator and
/// echoing it back in notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Create a job id from a server response body.
    ///
    /// Surrounding whitespace (such as a trailing newline) is stripped.
    ///
    /// # Errors
    /// Returns `Error::InvalidJobId` if nothing is left after trimming.
    pub fn new(raw: &str) -> Result<Self> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(Error::InvalidJobId("empty job id".to_string()));
        }
        Ok(JobId(token.to_string()))
    }

    /// Get the id as a string slice, exactly as it is sent to the server.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text the segment indicator shows for this ticket.
    ///
    /// The id is left-padded with `0` to three characters. Anything wider
    /// than four characters keeps only its first three. The result is
    /// prefixed with one blank column.
    ///
    /// ```
    /// use queuepost_core::JobId;
    ///
    /// assert_eq!(JobId::from(7).display_text(), " 007");
    /// assert_eq!(JobId::from(1234).display_text(), " 1234");
    /// assert_eq!(JobId::from(98765).display_text(), " 987");
    /// ```
    #[must_use]
    pub fn display_text(&self) -> String {
        let padded = format!("{:0>width$}", self.0, width = TICKET_MIN_WIDTH);
        let shown: String = if padded.chars().count() > TICKET_MAX_WIDTH {
            padded.chars().take(TICKET_TRUNCATED_WIDTH).collect()
        } else {
            padded
        };
        format!(" {shown}")
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        JobId::new(s)
    }
}

impl From<u32> for JobId {
    fn from(value: u32) -> Self {
        JobId(value.to_string())
    }
}

impl TryFrom<String> for JobId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        JobId::new(&value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

/// Station identifier sent as `device_id` with every queue request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceToken(String);

impl DeviceToken {
    /// Create a device token.
    ///
    /// # Errors
    /// Returns `Error::InvalidDeviceId` if the token is blank.
    pub fn new(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::InvalidDeviceId(
                "device id must not be empty".to_string(),
            ));
        }
        Ok(DeviceToken(token.to_string()))
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeviceToken {
    fn default() -> Self {
        DeviceToken(crate::constants::DEFAULT_DEVICE_ID.to_string())
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DeviceToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DeviceToken::new(s)
    }
}

impl TryFrom<String> for DeviceToken {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        DeviceToken::new(&value)
    }
}

impl From<DeviceToken> for String {
    fn from(token: DeviceToken) -> Self {
        token.0
    }
}
