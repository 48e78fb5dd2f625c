//! Human-readable device names.
//!
//! Readings are tagged with a name as well as the hardware address. The name
//! comes from a command-line alias when one is given, otherwise from the device
//! directory, and falls back to the address itself.

use crate::address::HardwareAddress;
use std::collections::BTreeMap;

/// A type alias for address-to-name mappings.
pub type AliasMap = BTreeMap<HardwareAddress, String>;

/// A parsed alias mapping a hardware address to a human-readable name.
#[derive(Debug, Clone)]
pub struct Alias {
    /// The hardware address (e.g., "ac:de:48:28:ac:ed")
    pub address: HardwareAddress,
    /// The human-readable name (e.g., "Desk")
    pub name: String,
}

/// Parse an alias from a string in the format "ADDRESS=NAME".
///
/// # Example
/// ```
/// use switchbot_recorder::alias::parse_alias;
///
/// let alias = parse_alias("ac:de:48:28:ac:ed=Desk").unwrap();
/// assert_eq!(alias.address.to_string(), "ac:de:48:28:ac:ed");
/// assert_eq!(alias.name, "Desk");
/// ```
pub fn parse_alias(src: &str) -> Result<Alias, String> {
    let (address, name) = src
        .split_once('=')
        .ok_or_else(|| "invalid alias: expected format ADDRESS=NAME".to_string())?;

    let address = address
        .parse::<HardwareAddress>()
        .map_err(|e| format!("invalid alias: {e}"))?;

    Ok(Alias {
        address,
        name: name.into(),
    })
}

/// Convert a slice of Alias values into an AliasMap.
pub fn to_map(aliases: &[Alias]) -> AliasMap {
    aliases.iter().map(|a| (a.address, a.name.clone())).collect()
}

/// Pick the display name for a device.
///
/// Aliases win over the directory name; without either, the address is used.
pub fn resolve_name(
    address: &HardwareAddress,
    aliases: &AliasMap,
    directory_name: Option<&str>,
) -> String {
    aliases
        .get(address)
        .map(String::as_str)
        .or(directory_name)
        .filter(|name| !name.is_empty())
        .map_or_else(|| address.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> HardwareAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_alias_valid() {
        let alias = parse_alias("ac:de:48:28:ac:ed=Desk").unwrap();
        assert_eq!(alias.address, addr("ac:de:48:28:ac:ed"));
        assert_eq!(alias.name, "Desk");
    }

    #[test]
    fn test_parse_alias_with_spaces() {
        let alias = parse_alias("ac:de:48:28:ac:ed=Living Room").unwrap();
        assert_eq!(alias.name, "Living Room");
    }

    #[test]
    fn test_parse_alias_invalid() {
        assert!(parse_alias("no-equals-sign").is_err());
        assert!(parse_alias("AC:DE:48:28:AC:ED=Desk").is_err());
    }

    #[test]
    fn test_to_map() {
        let aliases = vec![
            Alias {
                address: addr("ac:de:48:28:ac:ed"),
                name: "Desk".to_string(),
            },
            Alias {
                address: addr("ac:de:48:6c:5f:f0"),
                name: "Circulator".to_string(),
            },
        ];
        let map = to_map(&aliases);
        assert_eq!(map.get(&addr("ac:de:48:28:ac:ed")), Some(&"Desk".to_string()));
        assert_eq!(map.get(&addr("00:00:00:00:00:00")), None);
    }

    #[test]
    fn test_resolve_name_precedence() {
        let address = addr("ac:de:48:28:ac:ed");
        let aliases = to_map(&[Alias {
            address,
            name: "Office".to_string(),
        }]);

        assert_eq!(resolve_name(&address, &aliases, Some("Desk")), "Office");
        assert_eq!(resolve_name(&address, &AliasMap::new(), Some("Desk")), "Desk");
        assert_eq!(
            resolve_name(&address, &AliasMap::new(), None),
            "ac:de:48:28:ac:ed"
        );
        assert_eq!(
            resolve_name(&address, &AliasMap::new(), Some("")),
            "ac:de:48:28:ac:ed"
        );
    }
}
