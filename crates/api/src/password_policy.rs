// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password rules for SST accounts.
//!
//! Applied when an administrator registers a worker, supervisor or safety
//! officer, and when the bootstrap admin is seeded at startup.

use thiserror::Error;

/// Why a new account password was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// The confirmation field does not repeat the password.
    #[error("The password confirmation does not repeat the password")]
    ConfirmationDiffers,

    /// Fewer characters than the policy asks for.
    #[error("Account passwords need {min_chars} or more characters")]
    TooShort { min_chars: usize },

    /// Too few character classes (upper case, lower case, digit, symbol).
    #[error("Account passwords need {required} kinds of character, this one has {found}")]
    TooFewClasses { required: usize, found: usize },

    /// The password repeats the account's email or name.
    #[error("Account passwords may not repeat the account {field}")]
    ResemblesAccount { field: &'static str },
}

/// Minimums applied to new account passwords.
pub struct PasswordPolicy {
    /// Minimum length in characters.
    pub min_chars: usize,
    /// Minimum number of character classes, out of four.
    pub min_classes: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_chars: 12,
            min_classes: 3,
        }
    }
}

impl PasswordPolicy {
    /// Checks a new password for the account `email` held by `full_name`.
    ///
    /// Comparisons against the account are case-insensitive. The local part
    /// of the email counts as the email.
    ///
    /// # Errors
    ///
    /// Returns the first rule the password breaks.
    pub fn validate(
        &self,
        password: &str,
        confirmation: &str,
        email: &str,
        full_name: &str,
    ) -> Result<(), PasswordPolicyError> {
        if password != confirmation {
            return Err(PasswordPolicyError::ConfirmationDiffers);
        }

        if password.chars().count() < self.min_chars {
            return Err(PasswordPolicyError::TooShort {
                min_chars: self.min_chars,
            });
        }

        let found: usize = Self::character_classes(password);
        if found < self.min_classes {
            return Err(PasswordPolicyError::TooFewClasses {
                required: self.min_classes,
                found,
            });
        }

        let candidate: String = password.to_lowercase();
        let email: String = email.trim().to_lowercase();
        let mailbox: &str = email.split('@').next().unwrap_or_default();

        if candidate == email || (!mailbox.is_empty() && candidate == mailbox) {
            return Err(PasswordPolicyError::ResemblesAccount { field: "email" });
        }
        if candidate == full_name.trim().to_lowercase() {
            return Err(PasswordPolicyError::ResemblesAccount { field: "full_name" });
        }

        Ok(())
    }

    /// Number of character classes in `password`. Case is Unicode-aware, so
    /// `Ñ` is upper case; digits are ASCII only.
    fn character_classes(password: &str) -> usize {
        let classes: [fn(char) -> bool; 4] = [
            char::is_uppercase,
            char::is_lowercase,
            |c: char| c.is_ascii_digit(),
            |c: char| !c.is_alphanumeric() && !c.is_whitespace(),
        ];

        classes
            .iter()
            .filter(|class| password.chars().any(|c| class(c)))
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const EMAIL: &str = "ana@example.com";
    const NAME: &str = "Ana Torres";

    fn check(password: &str) -> Result<(), PasswordPolicyError> {
        PasswordPolicy::default().validate(password, password, EMAIL, NAME)
    }

    #[test]
    fn test_accepts_three_or_four_classes() {
        for password in [
            "Segur1dad#2026",
            "Supervisor2026",
            "almacen-2026!",
            "Casco+Guante1",
        ] {
            assert_eq!(check(password), Ok(()), "{password}");
        }
    }

    #[test]
    fn test_confirmation_must_repeat_password() {
        let result: Result<(), PasswordPolicyError> =
            PasswordPolicy::default().validate("Segur1dad#2026", "Segur1dad#2027", EMAIL, NAME);
        assert_eq!(result, Err(PasswordPolicyError::ConfirmationDiffers));
    }

    #[test]
    fn test_short_password_is_refused() {
        assert_eq!(
            check("Extintor#1"),
            Err(PasswordPolicyError::TooShort { min_chars: 12 })
        );
    }

    #[test]
    fn test_length_is_measured_in_characters() {
        // 11 characters, 13 bytes
        assert_eq!(
            check("Añoñuevo#26"),
            Err(PasswordPolicyError::TooShort { min_chars: 12 })
        );
        assert_eq!(check("Añoñuevo#267"), Ok(()));
    }

    #[test]
    fn test_single_class_passwords_are_refused() {
        assert_eq!(
            check("seguridadsalud"),
            Err(PasswordPolicyError::TooFewClasses {
                required: 3,
                found: 1
            })
        );
        assert_eq!(
            check("SeguridadSalud"),
            Err(PasswordPolicyError::TooFewClasses {
                required: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_password_may_not_repeat_email() {
        let policy: PasswordPolicy = PasswordPolicy::default();

        let mailbox: Result<(), PasswordPolicyError> = policy.validate(
            "Ana.Torres#26",
            "Ana.Torres#26",
            "ana.torres#26@example.com",
            NAME,
        );
        assert_eq!(
            mailbox,
            Err(PasswordPolicyError::ResemblesAccount { field: "email" })
        );

        let whole: Result<(), PasswordPolicyError> = policy.validate(
            "Ana.T0rres@example.com",
            "Ana.T0rres@example.com",
            " ana.t0rres@example.com ",
            NAME,
        );
        assert_eq!(
            whole,
            Err(PasswordPolicyError::ResemblesAccount { field: "email" })
        );
    }

    #[test]
    fn test_password_may_not_repeat_full_name() {
        let result: Result<(), PasswordPolicyError> = PasswordPolicy::default().validate(
            "Ana Torres 2026",
            "Ana Torres 2026",
            EMAIL,
            "ana torres 2026",
        );
        assert_eq!(
            result,
            Err(PasswordPolicyError::ResemblesAccount { field: "full_name" })
        );
    }

    #[test]
    fn test_character_classes() {
        let cases: [(&str, usize); 7] = [
            ("", 0),
            ("abc", 1),
            ("a b", 1),
            ("ÑANDÚ", 1),
            ("Ñandú", 2),
            ("abc!", 2),
            ("Aa1!", 4),
        ];
        for (password, expected) in cases {
            assert_eq!(
                PasswordPolicy::character_classes(password),
                expected,
                "{password}"
            );
        }
    }
}
