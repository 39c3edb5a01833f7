use std::sync::OnceLock;

use anyhow::{Context as _, Result};
use opentelemetry::{Context, global};
use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource, logs::SdkLoggerProvider, metrics::SdkMeterProvider, trace::SdkTracerProvider,
};
use tokio::time::Instant;
use tracing::info;

/// OpenTelemetry setup. Without a collector endpoint spans go to stdout and
/// logs and metrics stay local.
pub struct Telemetry {
    service_name: String,
    otel_endpoint: Option<String>,
    tracer: OnceLock<SdkTracerProvider>,
    meter: OnceLock<SdkMeterProvider>,
    logger: OnceLock<SdkLoggerProvider>,
}

pub struct TracingContext {
    pub cx: Context,
    pub start_time: Instant,
}

impl Telemetry {
    pub fn new(service_name: impl Into<String>, otel_endpoint: Option<String>) -> Self {
        Self {
            service_name: service_name.into(),
            otel_endpoint,
            tracer: OnceLock::new(),
            meter: OnceLock::new(),
            logger: OnceLock::new(),
        }
    }

    fn get_resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.service_name.clone())
            .build()
    }

    pub fn init_tracer(&self) -> Result<SdkTracerProvider> {
        let builder = SdkTracerProvider::builder().with_resource(self.get_resource());

        let provider = match &self.otel_endpoint {
            Some(endpoint) => {
                let exporter = SpanExporter::builder()
                    .with_tonic()
                    .with_endpoint(endpoint.clone())
                    .build()
                    .context("Failed to create span exporter")?;
                builder.with_batch_exporter(exporter).build()
            }
            None => builder
                .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
                .build(),
        };

        global::set_tracer_provider(provider.clone());
        let _ = self.tracer.set(provider.clone());

        Ok(provider)
    }

    pub fn init_meter(&self) -> Result<SdkMeterProvider> {
        let builder = SdkMeterProvider::builder().with_resource(self.get_resource());

        let provider = match &self.otel_endpoint {
            Some(endpoint) => {
                let exporter = MetricExporter::builder()
                    .with_tonic()
                    .with_endpoint(endpoint.clone())
                    .build()
                    .context("Failed to create metric exporter")?;
                builder.with_periodic_exporter(exporter).build()
            }
            None => builder.build(),
        };

        global::set_meter_provider(provider.clone());
        let _ = self.meter.set(provider.clone());

        Ok(provider)
    }

    pub fn init_logger(&self) -> Result<SdkLoggerProvider> {
        let builder = SdkLoggerProvider::builder().with_resource(self.get_resource());

        let provider = match &self.otel_endpoint {
            Some(endpoint) => {
                let exporter = LogExporter::builder()
                    .with_tonic()
                    .with_endpoint(endpoint.clone())
                    .build()
                    .context("Failed to create log exporter")?;
                builder.with_batch_exporter(exporter).build()
            }
            None => builder.build(),
        };

        let _ = self.logger.set(provider.clone());

        Ok(provider)
    }

    /// Flushes and shuts down whichever providers were initialised.
    pub fn shutdown(&self) -> Result<()> {
        let mut errors = Vec::new();

        if let Some(tracer) = self.tracer.get()
            && let Err(e) = tracer.shutdown()
        {
            errors.push(format!("tracer provider: {e}"));
        }
        if let Some(meter) = self.meter.get()
            && let Err(e) = meter.shutdown()
        {
            errors.push(format!("meter provider: {e}"));
        }
        if let Some(logger) = self.logger.get()
            && let Err(e) = logger.shutdown()
        {
            errors.push(format!("logger provider: {e}"));
        }

        if !errors.is_empty() {
            anyhow::bail!("Failed to shutdown providers:\n{}", errors.join("\n"));
        }

        info!("Telemetry providers shut down");
        Ok(())
    }
}
