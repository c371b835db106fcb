// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Flag,
    Value(String),
}

/// Ordered `--key [value]` pairs, as handed to the instance entrypoint.
///
/// A token following a key is its value unless it is itself a key, in which
/// case the first key is a bare flag.  Values therefore never start with
/// `--`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList(Vec<(String, ArgValue)>);

impl ArgList {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.0.push((key.to_string(), ArgValue::Value(value.into())));
        self
    }

    pub fn push_flag(&mut self, key: &str) -> &mut Self {
        self.0.push((key.to_string(), ArgValue::Flag));
        self
    }

    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.0.len() * 2);
        for (k, v) in &self.0 {
            argv.push(format!("--{k}"));
            if let ArgValue::Value(v) = v {
                argv.push(v.clone());
            }
        }
        argv
    }

    pub fn parse(argv: &[String]) -> Result<Self, Error> {
        let mut args = ArgList::new();
        let mut i = 0;

        while i < argv.len() {
            let token = &argv[i];
            let key = token
                .strip_prefix("--")
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    Error::Malformed(format!("expecting a key at position {i}, got '{token}'"))
                })?;

            if args.get(key).is_some() {
                return Err(Error::Malformed(format!("duplicated key '{key}'")));
            }

            match argv.get(i + 1) {
                Some(next) if !next.starts_with("--") => {
                    args.push(key, next.as_str());
                    i += 2;
                }
                _ => {
                    args.push_flag(key);
                    i += 1;
                }
            }
        }

        Ok(args)
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The value of `key`, if present.  A bare flag is a bad value.
    pub fn value(&self, key: &str) -> Result<Option<&str>, Error> {
        match self.get(key) {
            None => Ok(None),
            Some(ArgValue::Value(v)) => Ok(Some(v.as_str())),
            Some(ArgValue::Flag) => Err(Error::bad_value(key, "expecting a value")),
        }
    }

    pub fn require(&self, key: &str) -> Result<&str, Error> {
        self.value(key)?.ok_or_else(|| Error::missing(key))
    }

    pub fn has_flag(&self, key: &str) -> bool {
        self.get(key) == Some(&ArgValue::Flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn values_and_flags() {
        let a = ArgList::parse(&argv("--size 4096M --no-sgx --id abc --dry-run")).unwrap();

        assert_eq!(a.require("size").unwrap(), "4096M");
        assert_eq!(a.require("id").unwrap(), "abc");
        assert!(a.has_flag("no-sgx"));
        assert!(a.has_flag("dry-run"));
        assert!(!a.has_flag("size"));
    }

    #[test]
    fn to_argv_keeps_order() {
        let mut a = ArgList::new();
        a.push("size", "8M").push_flag("no-sgx").push("san", "localhost");

        assert_eq!(a.to_argv(), argv("--size 8M --no-sgx --san localhost"));
        assert_eq!(ArgList::parse(&a.to_argv()).unwrap(), a);
    }

    #[test]
    fn missing_key() {
        let a = ArgList::parse(&argv("--size 8M")).unwrap();
        assert_eq!(a.require("san"), Err(Error::missing("san")));
    }

    #[test]
    fn flag_where_value_expected() {
        let a = ArgList::parse(&argv("--san --size 8M")).unwrap();
        assert!(matches!(a.require("san"), Err(Error::Decode { .. })));
    }

    #[test]
    fn stray_value() {
        assert!(matches!(
            ArgList::parse(&argv("4096M --size")),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn duplicated_key() {
        assert!(matches!(
            ArgList::parse(&argv("--size 1M --size 2M")),
            Err(Error::Malformed(_))
        ));
    }
}
