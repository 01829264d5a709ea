//! Closed string enumerations used by template properties.
//!
//! Each enum renders as the exact string CloudFormation expects and parses
//! back from it; unknown strings are rejected rather than mapped to a default.

use crate::error::TemplateError;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the string value of this enum variant.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = TemplateError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $value => Ok(Self::$variant), )+
                    _ => Err(TemplateError::UnknownEnumValue {
                        kind: stringify!($name),
                        value: s.to_owned(),
                    }),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Resource `DeletionPolicy` / `UpdateReplacePolicy` attribute.
    DeletionPolicy {
        /// Delete the physical resource.
        Delete => "Delete",
        /// Keep the physical resource, orphaned from the stack.
        Retain => "Retain",
        /// Snapshot before deleting (only some resource types).
        Snapshot => "Snapshot",
        /// Retain, except when the resource failed during creation.
        RetainExceptOnCreate => "RetainExceptOnCreate",
    }
}

string_enum! {
    /// Template parameter type.
    ParameterType {
        /// A literal string.
        String => "String",
        /// An integer or float.
        Number => "Number",
        /// Comma-delimited list of strings.
        CommaDelimitedList => "CommaDelimitedList",
    }
}

string_enum! {
    /// CloudFront edge location price class.
    PriceClass {
        /// North America and Europe only.
        PriceClass100 => "PriceClass_100",
        /// Adds Asia, Middle East and Africa.
        PriceClass200 => "PriceClass_200",
        /// All edge locations.
        PriceClassAll => "PriceClass_All",
    }
}

string_enum! {
    /// Minimum TLS protocol version for viewer connections.
    SecurityPolicyProtocol {
        /// TLS 1.2, 2019 cipher set.
        TlsV12_2019 => "TLSv1.2_2019",
        /// TLS 1.2, 2021 cipher set.
        TlsV12_2021 => "TLSv1.2_2021",
        /// TLS 1.2, 2025 cipher set.
        TlsV12_2025 => "TLSv1.2_2025",
    }
}

string_enum! {
    /// How CloudFront serves HTTPS to viewers.
    SslSupportMethod {
        /// Server Name Indication.
        SniOnly => "sni-only",
        /// Dedicated IP addresses.
        Vip => "vip",
    }
}

string_enum! {
    /// Viewer protocol policy of a cache behavior.
    ViewerProtocolPolicy {
        /// Allow both HTTP and HTTPS.
        AllowAll => "allow-all",
        /// Reject plain HTTP.
        HttpsOnly => "https-only",
        /// Redirect HTTP to HTTPS.
        RedirectToHttps => "redirect-to-https",
    }
}

string_enum! {
    /// HTTP version served by a distribution.
    HttpVersion {
        /// HTTP/1.1.
        Http1_1 => "http1.1",
        /// HTTP/2.
        Http2 => "http2",
        /// HTTP/2 and HTTP/3.
        Http2And3 => "http2and3",
    }
}

string_enum! {
    /// ACM certificate validation method.
    ValidationMethod {
        /// CNAME records in a hosted zone.
        Dns => "DNS",
        /// Approval email.
        Email => "EMAIL",
    }
}

string_enum! {
    /// Route53 record type.
    RecordType {
        /// IPv4 address, or alias to an IPv4 target.
        A => "A",
        /// IPv6 address, or alias to an IPv6 target.
        Aaaa => "AAAA",
        /// Canonical name.
        Cname => "CNAME",
    }
}
