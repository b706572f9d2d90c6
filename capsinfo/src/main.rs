use anyhow::Result;
use argh::FromArgs;

use self::config::NegotiationConfig;
use self::graphics::Graphics;

mod config;
mod graphics;

fn main() -> Result<()> {
    let app: App = argh::from_env();
    app.run()
}

/// Vulkan capability negotiation report
#[derive(FromArgs)]
struct App {
    /// use Vulkan validation layer
    #[argh(switch)]
    vk_validation_layer: bool,

    /// enable GPU-assisted validation
    #[argh(switch)]
    gpu_validation: bool,

    /// request 16-bit storage and float16 arithmetic
    #[argh(switch)]
    fp16: bool,

    /// instance extension to enable, may be repeated
    #[argh(option)]
    extension: Vec<String>,

    /// instance layer to enable, may be repeated
    #[argh(option)]
    layer: Vec<String>,

    /// device extension to enable, may be repeated
    #[argh(option)]
    device_extension: Vec<String>,

    /// application name reported to the driver
    #[argh(option, default = "env!(\"CARGO_BIN_NAME\").to_owned()")]
    app_name: String,
}

impl App {
    pub fn run(self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::Level::INFO.into())
                    .from_env_lossy(),
            )
            .init();

        let config = NegotiationConfig {
            app_name: self.app_name,
            validation_layer: self.vk_validation_layer,
            gpu_validation: self.gpu_validation,
            fp16: self.fp16,
            extensions: self.extension,
            layers: self.layer,
            device_extensions: self.device_extension,
        };

        let graphics = Graphics::new(&config)?;

        let caps = graphics.caps();
        for layer in caps.layers().enabled_iter() {
            tracing::info!(%layer, "enabled instance layer");
        }
        for extension in caps.extensions().enabled_iter() {
            tracing::info!(%extension, "enabled instance extension");
        }
        if caps.validation_features().is_some() {
            tracing::info!("enabled GPU-assisted validation");
        }

        for physical_device in graphics.physical_devices()? {
            let name = graphics.device_name(physical_device);
            let (caps, result) = match graphics.negotiate_device(&config, physical_device) {
                Ok(negotiated) => negotiated,
                Err(e) => {
                    tracing::error!(device = %name, "device negotiation failed: {e:?}");
                    continue;
                }
            };

            tracing::info!(
                device = %name,
                swapchain = result.swapchain,
                fp16 = result.fp16,
                "negotiated device capabilities"
            );
            for extension in caps.extensions().enabled_iter() {
                tracing::info!(device = %name, %extension, "enabled device extension");
            }
            tracing::info!(
                device = %name,
                chain = ?caps.chain().collect::<Vec<_>>(),
                "device feature chain"
            );
        }

        Ok(())
    }
}
