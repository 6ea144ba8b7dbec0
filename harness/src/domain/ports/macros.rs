//! `define_port_error!`: error enums for ports and adapters.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! parameters accept anything convertible into the field type, so
//! `PersistenceError::query("timed out")` needs no `.to_owned()`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[must_use]
                    $vis fn [<$variant:snake>]( $( $($field: impl Into<$ty>),* )? ) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum LinkPortError {
            Unreachable { host: String } => "host unreachable: {host}",
            Saturated { size: u32 } => "pool saturated at {size} connections",
            Rejected { reason: String, attempt: u32 } => "statement rejected: {reason} (attempt {attempt})",
            Closed => "connection closed",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = LinkPortError::unreachable("db-1");
        assert_eq!(err.to_string(), "host unreachable: db-1");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = LinkPortError::saturated(42_u32);
        assert_eq!(err.to_string(), "pool saturated at 42 connections");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = LinkPortError::rejected("syntax", 7_u32);
        assert_eq!(err.to_string(), "statement rejected: syntax (attempt 7)");
    }

    define_port_error! {
        /// Module-private errors keep private constructors.
        enum HandshakeError {
            Timeout { after_ms: u64 } => "handshake timed out after {after_ms} ms",
        }
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(LinkPortError::closed(), LinkPortError::Closed);
    }

    #[test]
    fn private_enums_are_supported() {
        let err = HandshakeError::timeout(250_u64);
        assert_eq!(err, HandshakeError::Timeout { after_ms: 250 });
        assert_eq!(err.to_string(), "handshake timed out after 250 ms");
    }
}
