//! `sitenet normalize`: run one field normalizer, for checking gateway output.

use sitenet_core::normalize::{normalize_ip, normalize_mac, normalize_timestamp, normalize_type};

use crate::cli::{NormalizeArgs, NormalizeField};
use crate::error::CliError;
use crate::output;

use super::Context;

fn normalize(field: NormalizeField, raw: &str) -> Result<String, CliError> {
    let value = match field {
        NormalizeField::Mac => normalize_mac(raw)?.to_string(),
        NormalizeField::Ip => normalize_ip(raw)?,
        NormalizeField::Type => normalize_type(raw)?.to_string(),
        NormalizeField::Timestamp => normalize_timestamp(raw)?.to_rfc3339(),
    };
    Ok(value)
}

pub fn handle(args: &NormalizeArgs, ctx: &Context) -> Result<(), CliError> {
    let value = normalize(args.field, &args.value)?;
    let out = output::render_single(ctx.output, &value, Clone::clone, Clone::clone)?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn each_field_uses_its_normalizer() {
        assert_eq!(
            normalize(NormalizeField::Mac, "0011.22AA.BBCC").unwrap(),
            "00:11:22:aa:bb:cc"
        );
        assert_eq!(normalize(NormalizeField::Ip, " 10.0.0.7 ").unwrap(), "10.0.0.7");
        assert_eq!(normalize(NormalizeField::Type, "ipc").unwrap(), "Camera");
        assert_eq!(
            normalize(NormalizeField::Timestamp, "2024-05-01").unwrap(),
            "2024-05-01T00:00:00+00:00"
        );
    }

    #[test]
    fn failures_name_the_field() {
        let err = normalize(NormalizeField::Type, "printer").unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for type: type invalid");
    }
}
