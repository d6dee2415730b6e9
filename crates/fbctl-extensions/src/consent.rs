//! Publisher terms of service

use crate::error::{ExtensionsError, Result};

pub const PUBLISHER_TOS_SUMMARY: &str = "By registering as a publisher, you confirm that you have read the Firebase Extensions Publisher Terms and Conditions (linked below) and you, on behalf of yourself and the organization you represent, agree to comply with it.  Here is a brief summary of the highlights of our terms and conditions:
  - You ensure extensions you publish comply with all laws and regulations; do not include any viruses, spyware, Trojan horses, or other malicious code; and do not violate any person's rights, including intellectual property, privacy, and security rights.
  - You will not engage in any activity that interferes with or accesses in an unauthorized manner the properties or services of Google, Google's affiliates, or any third party.
  - If you become aware or should be aware of a critical security issue in your extension, you will provide either a resolution or a written resolution plan within 48 hours.
  - If Google requests a critical security matter to be patched for your extension, you will respond to Google within 48 hours with either a resolution or a written resolution plan.
  - Google may remove your extension or terminate the agreement, if you violate any terms.";

pub const PUBLISHER_TOS_QUESTION: &str = "Do you accept the Firebase Extensions Publisher Terms and Conditions (https://firebase.google.com/docs/extensions/alpha/terms-of-service) and acknowledge that your information will be used in accordance with Google's Privacy Policy (https://policies.google.com/privacy?hl=en)?";

/// Ask for consent through `confirm`; anything but yes is an error
pub fn prompt_for_publisher_tos<F>(confirm: F) -> Result<()>
where
    F: FnOnce(&str) -> Result<bool>,
{
    if !confirm(PUBLISHER_TOS_QUESTION)? {
        return Err(ExtensionsError::validation(
            "You must agree to the terms of service to register a publisher ID.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declined_consent_errors() {
        let err = prompt_for_publisher_tos(|_| Ok(false)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You must agree to the terms of service to register a publisher ID."
        );
    }

    #[test]
    fn test_accepted_consent_sees_question() {
        let mut asked = String::new();
        prompt_for_publisher_tos(|q| {
            asked = q.to_string();
            Ok(true)
        })
        .unwrap();
        assert!(asked.contains("Publisher Terms and Conditions"));
    }
}
