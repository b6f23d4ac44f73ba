use std::fmt;

/// Custom error type for voice-sql operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Invalid configuration
    InvalidConfiguration(String)
  , /// HTTP transport error (connect, body read)
    HttpError(String)
  , /// Upstream returned an error response
    ApiError(String)
  , /// Failed to parse upstream response
    ParseError(String)
  , /// Upstream answered but generated nothing
    NoGenerations
  , /// Model is not yet loaded on the upstream
    ModelLoading
    {   retry_after_secs: u64
    }
  , /// Timeout error
    Timeout
  , /// Generic error
    Other(String)
}

impl Error
{   /// Whether the caller should simply come back later
    pub fn is_warming_up(&self) -> bool
    {   matches!(self, Error::ModelLoading { .. })
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "Server Error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "AI Error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "AI Error: unexpected response: {}", msg)
            }
          , Error::NoGenerations => {
              write!(f, "AI Error: response contained no generations")
            }
          , Error::ModelLoading { retry_after_secs } => {
              write!(f,
                "AI model is warming up. Please try again in {} seconds.",
                retry_after_secs
              )
            }
          , Error::Timeout => {
              write!(f, "Server Error: request to AI timed out")
            }
          , Error::Other(msg) => {
              write!(f, "Server Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}
