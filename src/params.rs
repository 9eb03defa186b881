use std::fmt;
use std::str::FromStr;

/// A single `key=value` parameter destined for a module's install script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleParam {
    pub key: String,
    pub value: String,
}

impl FromStr for ModuleParam {
    type Err = String;

    /// Split on the first `=`; the value may itself contain `=`. The key
    /// format is not validated further.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.split_once('=') {
            Some((key, value)) => Ok(ModuleParam {
                key: key.to_string(),
                value: value.to_string(),
            }),
            None => Err(format!("expected KEY=VALUE, got '{raw}'")),
        }
    }
}

impl fmt::Display for ModuleParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Render a parameter in the positional-flag convention install scripts
/// expect: `key=value` becomes `--key value`.
pub fn translate(param: &ModuleParam) -> [String; 2] {
    [format!("--{}", param.key), param.value.clone()]
}

/// Flatten an ordered parameter list into an argument vector, preserving
/// the order the parameters were given on the command line.
pub fn to_args(params: &[ModuleParam]) -> Vec<String> {
    params.iter().flat_map(translate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_first_equals() {
        let param: ModuleParam = "key=value".parse().unwrap();
        assert_eq!(param.key, "key");
        assert_eq!(param.value, "value");
    }

    #[test]
    fn test_parse_value_may_contain_equals() {
        let param: ModuleParam = "connection=host=db.example.com".parse().unwrap();
        assert_eq!(param.key, "connection");
        assert_eq!(param.value, "host=db.example.com");
    }

    #[test]
    fn test_parse_empty_value() {
        let param: ModuleParam = "flag=".parse().unwrap();
        assert_eq!(param.key, "flag");
        assert_eq!(param.value, "");
    }

    #[test]
    fn test_parse_rejects_missing_equals() {
        assert!("no-separator".parse::<ModuleParam>().is_err());
    }

    #[test]
    fn test_translate() {
        let param: ModuleParam = "k=v".parse().unwrap();
        assert_eq!(translate(&param), ["--k".to_string(), "v".to_string()]);
    }

    #[test]
    fn test_to_args_preserves_order() {
        let params = vec![
            "version=1.2.3".parse::<ModuleParam>().unwrap(),
            "user=deploy".parse::<ModuleParam>().unwrap(),
        ];
        assert_eq!(
            to_args(&params),
            vec!["--version", "1.2.3", "--user", "deploy"]
        );
    }
}
