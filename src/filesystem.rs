use crate::error::AppError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[cfg(target_os = "android")]
const ANDROID_PACKAGE: &str = "dev.geofoto.app";

#[cfg(target_os = "android")]
fn android_files_dir() -> Option<PathBuf> {
    use jni::{
        objects::{JObject, JString},
        JavaVM,
    };
    unsafe {
        let ctx = ndk_context::android_context();
        let vm = JavaVM::from_raw(ctx.vm().cast()).ok()?;
        let mut env = vm.attach_current_thread().ok()?;
        let activity = JObject::from_raw(ctx.context().cast());
        let files_dir = env
            .call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_obj = env
            .call_method(files_dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_jstring: JString = JString::from(abs_path_obj);
        let abs_path: String = env.get_string(&abs_path_jstring).ok()?.into();
        Some(PathBuf::from(abs_path))
    }
}

/// Get the app-private data directory for the current platform
pub fn get_app_data_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        if let Some(dir) = android_files_dir() {
            return dir;
        }
        // Fallbacks
        for d in [
            format!("/data/user/0/{}/files", ANDROID_PACKAGE),
            format!("/data/data/{}/files", ANDROID_PACKAGE),
        ] {
            let p = PathBuf::from(d);
            if p.exists() {
                return p;
            }
        }
        PathBuf::from("./data")
    }

    #[cfg(not(target_os = "android"))]
    {
        PathBuf::from("./data")
    }
}

/// Directory that receives exported ("downloaded") files
pub fn get_export_base_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        PathBuf::from(format!(
            "/storage/emulated/0/Android/data/{}/files/exports",
            ANDROID_PACKAGE
        ))
    }

    #[cfg(not(target_os = "android"))]
    {
        PathBuf::from("./exports")
    }
}

/// Read/write access to named files in app storage
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Returns [`AppError::NotFound`] if no file with this name exists
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, AppError>;

    /// Creates or replaces the file
    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), AppError>;
}

/// [`FileStore`] backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, AppError> {
        match tokio::fs::read(self.path_of(name)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.path_of(name), data).await?;
        log::debug!("Wrote {} bytes to {}", data.len(), name);
        Ok(())
    }
}

/// Hands a generated file to the user ("save as" / browser download)
///
/// Fire-and-forget: implementations report failures through the log only.
pub trait DownloadSink: Send + Sync {
    fn trigger_download(&self, data: &[u8], file_name: &str);
}

/// [`DownloadSink`] that saves into the export directory
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    export_dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

impl DownloadSink for FileDownloadSink {
    fn trigger_download(&self, data: &[u8], file_name: &str) {
        let target = self.export_dir.join(file_name);
        let result = std::fs::create_dir_all(&self.export_dir)
            .and_then(|_| std::fs::write(&target, data));
        match result {
            Ok(()) => log::info!("Exported {} bytes to {}", data.len(), target.display()),
            Err(e) => log::error!("Export to {} failed: {}", target.display(), e),
        }
    }
}
