//! Command-line option resolution shared by every tool.
//!
//! Each tool describes its flags once as a [`ToolSpec`] table. Resolving an
//! argument list against that table either yields a complete
//! [`ParsedOptions`] (every declared key holds exactly one value) or an
//! [`OptionError`] describing the first problem found. Nothing partial is
//! ever handed back.

mod error;
pub mod tools;

use std::collections::BTreeMap;

use clap::ValueEnum;

pub use error::OptionError;
pub use tools::{
    DepthMode, DepthSensingOptions, PlaybackOptions, Resolution, SensingMode, SvoDoctorOptions,
    Unit, VideoCaptureOptions,
};

/// A resolved flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Text(String),
    Flag(bool),
}

/// How a value-taking flag checks the token that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueRule {
    /// Value must be one of these, compared exactly
    OneOf(Vec<String>),
    /// Any text except the empty string
    NonEmpty,
    /// One or more ASCII decimal digits, kept verbatim
    Digits,
}

impl ValueRule {
    /// Build a `OneOf` rule from the possible-value names of a clap enum.
    pub fn one_of<T: ValueEnum>() -> Self {
        ValueRule::OneOf(value_names::<T>())
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ValueRule::OneOf(allowed) => allowed.iter().any(|a| a == value),
            ValueRule::NonEmpty => !value.is_empty(),
            ValueRule::Digits => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
        }
    }

    /// Allowed values, empty when the rule is a free-form predicate.
    pub fn allowed_values(&self) -> &[String] {
        match self {
            ValueRule::OneOf(allowed) => allowed,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    /// Present means true; consumes no value
    Switch,
    /// Consumes the next token as its value
    Value(ValueRule),
}

/// One declared flag of a tool.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub key: &'static str,
    pub kind: OptionKind,
    pub default: OptionValue,
}

impl OptionSpec {
    pub fn switch(key: &'static str) -> Self {
        Self {
            key,
            kind: OptionKind::Switch,
            default: OptionValue::Flag(false),
        }
    }

    pub fn value(key: &'static str, rule: ValueRule, default: &str) -> Self {
        Self {
            key,
            kind: OptionKind::Value(rule),
            default: OptionValue::Text(default.to_string()),
        }
    }
}

/// Rule checked once every flag has been scanned. Returns the diagnostic on
/// failure.
pub type CrossValidator = fn(&ParsedOptions) -> Result<(), String>;

/// What a tool does with an empty argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyArgs {
    /// Run with every default
    Defaults,
    /// Reject, showing this usage line
    Usage(&'static str),
}

/// The full, immutable flag table of one tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub options: Vec<OptionSpec>,
    pub cross_validator: Option<CrossValidator>,
    pub empty_args: EmptyArgs,
}

enum ScanState<'a> {
    AwaitingKey,
    AwaitingValue(&'a OptionSpec),
}

impl ToolSpec {
    fn lookup(&self, token: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.key == token)
    }

    /// All declared keys mapped to their defaults.
    pub fn defaults(&self) -> ParsedOptions {
        ParsedOptions {
            values: self
                .options
                .iter()
                .map(|spec| (spec.key, spec.default.clone()))
                .collect(),
        }
    }

    /// Resolve an argument list (program name excluded) against this table.
    pub fn resolve<I, S>(&self, args: I) -> Result<ParsedOptions, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = self.defaults();
        let mut state = ScanState::AwaitingKey;
        let mut seen_any = false;

        for arg in args {
            let token = arg.as_ref();
            seen_any = true;

            state = match state {
                ScanState::AwaitingValue(spec) => {
                    let accepted = match &spec.kind {
                        OptionKind::Value(rule) => rule.accepts(token),
                        OptionKind::Switch => false,
                    };
                    if !accepted {
                        return Err(OptionError::invalid_value(spec.key, token));
                    }
                    parsed.set(spec.key, OptionValue::Text(token.to_string()));
                    ScanState::AwaitingKey
                }
                ScanState::AwaitingKey => match self.lookup(token) {
                    Some(spec) if spec.kind == OptionKind::Switch => {
                        parsed.set(spec.key, OptionValue::Flag(true));
                        ScanState::AwaitingKey
                    }
                    Some(spec) => ScanState::AwaitingValue(spec),
                    None => {
                        return Err(OptionError::UnknownOption {
                            token: token.to_string(),
                        })
                    }
                },
            };
        }

        if let ScanState::AwaitingValue(spec) = state {
            return Err(OptionError::invalid_value(spec.key, ""));
        }

        if !seen_any {
            return match self.empty_args {
                EmptyArgs::Defaults => Ok(parsed),
                EmptyArgs::Usage(usage) => Err(OptionError::MissingRequiredOption {
                    usage: usage.to_string(),
                }),
            };
        }

        if let Some(validate) = self.cross_validator {
            validate(&parsed).map_err(|detail| OptionError::InfeasibleCombination { detail })?;
        }

        log::debug!("{}: resolved options {:?}", self.name, parsed);
        Ok(parsed)
    }
}

/// Resolved values for every key of a [`ToolSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOptions {
    values: BTreeMap<&'static str, OptionValue>,
}

impl ParsedOptions {
    fn set(&mut self, key: &'static str, value: OptionValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Value of a value-taking flag.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(OptionValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Value of a boolean switch.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(OptionValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Flag value naming `value`, e.g. `"milli"` for [`Unit::Milli`].
pub fn value_name<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|p| p.get_name().to_string())
        .unwrap_or_default()
}

/// Possible-value names of a clap enum, in declaration order.
pub fn value_names<T: ValueEnum>() -> Vec<String> {
    T::value_variants()
        .iter()
        .filter_map(|v| v.to_possible_value())
        .map(|p| p.get_name().to_string())
        .collect()
}
