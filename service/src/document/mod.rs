//! Rental document generation.
//!
//! Documents render in two phases: templates embed the
//! [`SIGNATURE_PLACEHOLDER`] marker, and [`sign()`] later substitutes it with
//! a reference to the captured customer signature image. A document without
//! the marker cannot be signed.

pub mod contract;
pub mod protocol;

use derive_more::{Display, Error};

use crate::domain::image;

/// Marker embedded into drafted documents in place of the customer signature.
pub const SIGNATURE_PLACEHOLDER: &str = "<<CUSTOMER-SIGNATURE>>";

/// Substitutes the [`SIGNATURE_PLACEHOLDER`] in the given document `text`
/// with a reference to the captured `signature` image.
///
/// # Errors
///
/// If the `text` doesn't contain the [`SIGNATURE_PLACEHOLDER`], meaning the
/// document was already signed or wasn't produced by a drafting template.
pub fn sign(text: &str, signature: &image::Ref) -> Result<String, SignError> {
    if !text.contains(SIGNATURE_PLACEHOLDER) {
        return Err(SignError::PlaceholderNotFound);
    }
    Ok(text.replacen(
        SIGNATURE_PLACEHOLDER,
        &format!("[signed by customer: image {signature}]"),
        1,
    ))
}

/// Error of signing a rental document.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum SignError {
    /// Document text doesn't contain the [`SIGNATURE_PLACEHOLDER`].
    #[display("document contains no signature placeholder")]
    PlaceholderNotFound,
}

#[cfg(test)]
mod spec {
    use crate::domain::image;

    use super::{sign, SignError, SIGNATURE_PLACEHOLDER};

    #[test]
    fn substitutes_the_placeholder_with_the_image_reference() {
        let sig = image::Ref::new();
        let text = format!("Signed below:\n{SIGNATURE_PLACEHOLDER}\n");

        let signed = sign(&text, &sig).unwrap();

        assert!(!signed.contains(SIGNATURE_PLACEHOLDER));
        assert!(signed.contains(&sig.to_string()));
    }

    #[test]
    fn refuses_to_sign_twice() {
        let sig = image::Ref::new();
        let text = format!("Signed below:\n{SIGNATURE_PLACEHOLDER}\n");

        let signed = sign(&text, &sig).unwrap();

        assert!(matches!(
            sign(&signed, &sig),
            Err(SignError::PlaceholderNotFound),
        ));
    }
}
