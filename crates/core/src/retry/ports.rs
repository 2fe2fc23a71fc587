//! Port interfaces for header access
//!
//! These traits define the boundary between retry admission and the HTTP
//! representation the data path uses. Adapters for the `http` crate types are
//! provided below.

use std::borrow::Cow;

use http::header::HeaderMap;
use http::response::Parts;
use http::{Request, Response};
use retrygate_domain::constants::HEADER_GRPC_STATUS;
use retrygate_domain::GrpcStatus;

/// Mutable view of the downstream request headers
pub trait RequestHeaders {
    /// Value of `name`, with repeated fields joined by `,`.
    ///
    /// Values that are not valid UTF-8 are treated as absent.
    fn header_value(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Remove every occurrence of `name`.
    fn remove_header(&mut self, name: &str);
}

/// Read-only view of an upstream response
pub trait ResponseHeaders {
    /// HTTP status code, when the view carries one.
    fn status(&self) -> Option<u16>;

    fn has_header(&self, name: &str) -> bool;

    /// Value of `name`, with repeated fields joined by `,`.
    fn header_value(&self, name: &str) -> Option<Cow<'_, str>>;

    /// gRPC status carried in the `grpc-status` header, if any.
    fn grpc_status(&self) -> Option<GrpcStatus> {
        self.header_value(HEADER_GRPC_STATUS).map(|value| GrpcStatus::from_header_value(&value))
    }
}

fn joined_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    let mut values = headers.get_all(name).iter();
    let first = values.next()?.to_str().ok()?;

    let mut rest = values.peekable();
    if rest.peek().is_none() {
        return Some(Cow::Borrowed(first));
    }

    let mut joined = first.to_owned();
    for value in rest {
        joined.push(',');
        joined.push_str(value.to_str().ok()?);
    }
    Some(Cow::Owned(joined))
}

impl RequestHeaders for HeaderMap {
    fn header_value(&self, name: &str) -> Option<Cow<'_, str>> {
        joined_value(self, name)
    }

    fn remove_header(&mut self, name: &str) {
        self.remove(name);
    }
}

impl<B> RequestHeaders for Request<B> {
    fn header_value(&self, name: &str) -> Option<Cow<'_, str>> {
        joined_value(self.headers(), name)
    }

    fn remove_header(&mut self, name: &str) {
        self.headers_mut().remove(name);
    }
}

impl ResponseHeaders for HeaderMap {
    fn status(&self) -> Option<u16> {
        None
    }

    fn has_header(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn header_value(&self, name: &str) -> Option<Cow<'_, str>> {
        joined_value(self, name)
    }
}

impl<B> ResponseHeaders for Response<B> {
    fn status(&self) -> Option<u16> {
        Some(Response::status(self).as_u16())
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains_key(name)
    }

    fn header_value(&self, name: &str) -> Option<Cow<'_, str>> {
        joined_value(self.headers(), name)
    }
}

impl ResponseHeaders for Parts {
    fn status(&self) -> Option<u16> {
        Some(self.status.as_u16())
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    fn header_value(&self, name: &str) -> Option<Cow<'_, str>> {
        joined_value(&self.headers, name)
    }
}
