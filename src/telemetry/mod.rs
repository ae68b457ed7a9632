use anyhow::Result;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Keeps the OTLP providers alive; dropping it flushes pending spans and logs.
#[derive(Debug, Default)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shut down tracer provider: {}", e);
            }
        }
        if let Some(provider) = self.logger_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shut down logger provider: {}", e);
            }
        }
    }
}

/// Installs the global subscriber. `ansi` is off for the console so log lines
/// do not fight with the rendered table.
pub fn initialize_telemetry_with_configuration(
    config: &TelemetryConfig,
    ansi: bool,
) -> Result<TelemetryGuard> {
    let env_filter = create_environment_filter(&config.log_level, &config.excluded_modules)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_names(true)
        .with_ansi(ansi)
        .with_writer(std::io::stderr);

    if !config.enabled {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
        return Ok(TelemetryGuard::default());
    }

    let logger_provider = create_logger_provider(config)?;
    let logger_layer = OpenTelemetryTracingBridge::new(&logger_provider);

    let tracer_provider = create_tracer_provider(config)?;
    let tracer = tracer_provider.tracer(config.service_name.clone());
    let tracer_layer = OpenTelemetryLayer::new(tracer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(logger_layer)
        .with(tracer_layer)
        .try_init()?;

    Ok(TelemetryGuard {
        tracer_provider: Some(tracer_provider),
        logger_provider: Some(logger_provider),
    })
}

fn create_environment_filter(log_level: &str, excluded_modules: &[String]) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_new(log_level)?;

    for module in excluded_modules {
        let directive = format!("{}=off", module);
        filter = filter.add_directive(directive.parse()?);
    }

    Ok(filter)
}

fn create_opentelemetry_resource(service_name: &str) -> Resource {
    Resource::builder()
        .with_service_name(service_name.to_string())
        .build()
}

fn create_tracer_provider(config: &TelemetryConfig) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create span exporter: {}", e))?;

    Ok(SdkTracerProvider::builder()
        .with_resource(create_opentelemetry_resource(&config.service_name))
        .with_batch_exporter(exporter)
        .build())
}

fn create_logger_provider(config: &TelemetryConfig) -> Result<SdkLoggerProvider> {
    let exporter = LogExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create log exporter: {}", e))?;

    Ok(SdkLoggerProvider::builder()
        .with_resource(create_opentelemetry_resource(&config.service_name))
        .with_batch_exporter(exporter)
        .build())
}
