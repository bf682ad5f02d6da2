use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use regex::Regex;
use secrecy::SecretString;

pub const ARG_USERNAME: &str = "username";
pub const ARG_EMAIL: &str = "email";
pub const ARG_ROLE: &str = "role";
pub const ARG_PASSWORD: &str = "password";

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Shallow client-side check; the server owns the real validation.
#[must_use]
pub fn validator_email() -> ValueParser {
    ValueParser::from(move |email: &str| -> std::result::Result<String, String> {
        let email = email.trim();
        let re = Regex::new(EMAIL_PATTERN).map_err(|e| e.to_string())?;
        if re.is_match(email) {
            Ok(email.to_string())
        } else {
            Err("invalid email address".to_string())
        }
    })
}

fn username_arg() -> Arg {
    Arg::new(ARG_USERNAME)
        .short('u')
        .long("username")
        .help("Account username")
        .env("VAULTGATE_USERNAME")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .long("password")
        .help("Account password; prompted for when omitted")
        .env("VAULTGATE_PASSWORD")
        .hide_env_values(true)
}

#[must_use]
pub fn signup() -> Command {
    Command::new("signup")
        .about("Create an account, confirmed with an emailed one-time code")
        .arg(username_arg())
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long("email")
                .help("Email address that receives the code")
                .env("VAULTGATE_EMAIL")
                .required(true)
                .value_parser(validator_email()),
        )
        .arg(
            Arg::new(ARG_ROLE)
                .long("role")
                .help("Requested role (default: user)"),
        )
        .arg(password_arg())
}

#[must_use]
pub fn signin() -> Command {
    Command::new("signin")
        .about("Sign in with password and an emailed one-time code")
        .arg(username_arg())
        .arg(password_arg())
}

/// Credential fields common to signup and signin.
#[derive(Debug)]
pub struct Options {
    pub username: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<SecretString>,
}

impl Options {
    /// # Errors
    /// Returns an error if the username is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let username = matches
            .get_one::<String>(ARG_USERNAME)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_USERNAME}"))?;

        let optional = |id: &str| -> Option<String> {
            matches
                .try_get_one::<String>(id)
                .ok()
                .flatten()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Ok(Self {
            username,
            email: optional(ARG_EMAIL),
            role: optional(ARG_ROLE),
            password: matches
                .get_one::<String>(ARG_PASSWORD)
                .filter(|s| !s.is_empty())
                .map(|s| SecretString::from(s.clone())),
        })
    }
}
