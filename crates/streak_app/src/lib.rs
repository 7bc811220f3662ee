pub mod app;

#[cfg(target_os = "android")]
use winit::platform::android::activity::AndroidApp;

#[cfg(target_os = "android")]
#[no_mangle]
fn android_main(android_app: AndroidApp) {
    tracing_subscriber::fmt::init();

    let config = app::AppConfig::from_env().unwrap_or_default();
    let options = eframe::NativeOptions {
        android_app: Some(android_app),
        ..Default::default()
    };

    if let Err(err) = app::run_with_options(config, options) {
        tracing::error!(%err, "Android runtime terminated unexpectedly");
    }
}
