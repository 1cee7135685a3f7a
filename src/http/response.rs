/// Result of handling one request, and the status it is reported with.
///
/// - `Ok` (200): handler ran and succeeded
/// - `BadRequest` (400): request line malformed, too large or too slow
/// - `NotFound` (404): no handler registered for the path
/// - `HandlerError` (500): handler ran and reported failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 NOT FOUND
    NotFound,
    /// 500 Internal Server Error
    HandlerError,
}

impl Outcome {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use pathwire::http::response::Outcome;
    /// assert_eq!(Outcome::Ok.as_u16(), 200);
    /// assert_eq!(Outcome::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            Outcome::Ok => 200,
            Outcome::BadRequest => 400,
            Outcome::NotFound => 404,
            Outcome::HandlerError => 500,
        }
    }

    /// Status text placed after `HTTP/1.1` on the status line.
    ///
    /// The 404 phrase is upper case; clients of the device match on it.
    pub fn status_line(&self) -> &'static str {
        match self {
            Outcome::Ok => "200 OK",
            Outcome::BadRequest => "400 Bad Request",
            Outcome::NotFound => "404 NOT FOUND",
            Outcome::HandlerError => "500 Internal Server Error",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Outcome::Ok => "a-ok",
            Outcome::BadRequest => "Unable to parse request.",
            Outcome::NotFound => "Resource not found.",
            Outcome::HandlerError => "Something went wrong.",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

/// A response ready to be serialized by the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub outcome: Outcome,
    pub message: String,
}

impl Response {
    /// Creates a response carrying the outcome's default message.
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            message: outcome.default_message().to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn ok() -> Self {
        Self::new(Outcome::Ok)
    }

    pub fn bad_request() -> Self {
        Self::new(Outcome::BadRequest)
    }

    pub fn not_found() -> Self {
        Self::new(Outcome::NotFound)
    }

    pub fn handler_error() -> Self {
        Self::new(Outcome::HandlerError)
    }
}
