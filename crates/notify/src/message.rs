//! Warning Message Formatting

use alerting::AlarmFlags;
use storage::UnitConfig;

/// Render the multi-line warning for the raised flags, naming each
/// offending measurement and the unit's address when one is configured.
/// Returns `None` when nothing crossed a threshold.
pub fn warning_message(flags: &AlarmFlags, config: &UnitConfig) -> Option<String> {
    if !flags.any() {
        return None;
    }

    let mut msg = String::from("Warning!!\n");
    if let Some(address) = &config.address {
        msg.push_str(&format!("At {}\n", address));
    }
    if flags.flame {
        msg.push_str(&format!("Flame less than {}\n", config.ref_flame));
    }
    if flags.gas {
        msg.push_str(&format!("Gas over {}\n", config.ref_gas));
    }
    if flags.temp {
        msg.push_str(&format!("Temp over {}\n", config.ref_temp));
    }

    Some(msg)
}
