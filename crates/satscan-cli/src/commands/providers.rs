use serde::Serialize;

use satscan_core::ProviderId;

use crate::cli::ProvidersArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ProviderEntry {
    id: ProviderId,
    host: &'static str,
    base_url: String,
    schema: &'static str,
}

#[derive(Debug, Serialize)]
struct ProvidersResponseData {
    providers: Vec<ProviderEntry>,
}

pub fn run(args: &ProvidersArgs) -> Result<serde_json::Value, CliError> {
    let registry = args.selection.registry()?;

    let providers = registry
        .providers()
        .iter()
        .map(|provider| ProviderEntry {
            id: provider.id(),
            host: provider.id().host(),
            base_url: provider.base_url().to_owned(),
            schema: provider.parser().schema_name(),
        })
        .collect::<Vec<_>>();

    Ok(serde_json::to_value(ProvidersResponseData { providers })?)
}
