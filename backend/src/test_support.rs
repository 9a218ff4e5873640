//! Test utilities for the carbon API crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and behind the `test-support` feature.

pub mod clock {
    //! Deterministic clock.

    use std::sync::{Mutex, MutexGuard, PoisonError};

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Seconds from the Unix epoch to 2024-01-01T00:00:00Z.
    const DEFAULT_EPOCH_SECONDS: i64 = 1_704_067_200;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        /// Start the clock at `now`.
        #[must_use]
        pub const fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Move the clock forward.
        pub fn advance(&self, delta: TimeDelta) {
            *self.lock_clock() += delta;
        }

        fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
            self.0.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Default for MutableClock {
        /// Starts at 2024-01-01T00:00:00Z.
        fn default() -> Self {
            Self::new(DateTime::UNIX_EPOCH + TimeDelta::seconds(DEFAULT_EPOCH_SECONDS))
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod http {
    //! Request builders for Basic authentication and multipart bodies.

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    /// Boundary used by [`multipart_body`].
    pub const MULTIPART_BOUNDARY: &str = "carbon-api-test-boundary";

    /// `Authorization` header value for the given credentials.
    ///
    /// # Examples
    /// ```
    /// use carbon_api::test_support::basic_auth_header;
    ///
    /// assert_eq!(basic_auth_header("admin", "password"), "Basic YWRtaW46cGFzc3dvcmQ=");
    /// ```
    #[must_use]
    pub fn basic_auth_header(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }

    /// `Content-Type` header value matching [`multipart_body`].
    #[must_use]
    pub fn multipart_content_type() -> String {
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
    }

    /// One part of a `multipart/form-data` body.
    #[derive(Debug, Clone, Copy)]
    pub struct MultipartPart<'a> {
        name: &'a str,
        file_name: Option<&'a str>,
        content_type: Option<&'a str>,
        data: &'a [u8],
    }

    impl<'a> MultipartPart<'a> {
        /// Plain text field.
        #[must_use]
        pub const fn text(name: &'a str, value: &'a str) -> Self {
            Self {
                name,
                file_name: None,
                content_type: None,
                data: value.as_bytes(),
            }
        }

        /// File field with a declared MIME type.
        #[must_use]
        pub const fn file(
            name: &'a str,
            file_name: &'a str,
            content_type: &'a str,
            data: &'a [u8],
        ) -> Self {
            Self {
                name,
                file_name: Some(file_name),
                content_type: Some(content_type),
                data,
            }
        }
    }

    /// Encode `parts` with [`MULTIPART_BOUNDARY`].
    #[must_use]
    pub fn multipart_body(parts: &[MultipartPart<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            let mut head = format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"",
                part.name
            );
            if let Some(file_name) = part.file_name {
                head.push_str(&format!("; filename=\"{file_name}\""));
            }
            head.push_str("\r\n");
            if let Some(content_type) = part.content_type {
                head.push_str(&format!("Content-Type: {content_type}\r\n"));
            }
            head.push_str("\r\n");
            body.extend_from_slice(head.as_bytes());
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
        body
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.
    //!
    //! Resolve `RefOr<Schema>` wrappers to concrete `Object` schemas with a
    //! diagnostic panic on type mismatches.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema.
    ///
    /// # Panics
    /// Panics with a description of the actual schema kind when it is not an
    /// inline object.
    #[must_use]
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => {
                panic!(
                    "schema '{name}' is a $ref to '{}'; resolve the reference first",
                    reference.ref_location
                );
            }
            RefOr::T(Schema::Array(_)) => panic!("schema '{name}' is an Array, not an Object"),
            _ => panic!("schema '{name}' has unexpected type"),
        }
    }

    /// Get a property from an Object schema by name.
    ///
    /// # Panics
    /// Panics if the property does not exist.
    #[must_use]
    pub fn get_property<'a>(obj: &'a Object, field: &str) -> &'a RefOr<Schema> {
        match obj.properties.get(field) {
            Some(property) => property,
            None => panic!("property '{field}' not found"),
        }
    }
}

pub use clock::MutableClock;
pub use http::{
    MULTIPART_BOUNDARY, MultipartPart, basic_auth_header, multipart_body, multipart_content_type,
};
