//! PDF 渲染器 - 基础设施层
//!
//! 持有稀缺资源（页面图片所在目录），只暴露"PDF → 页面图片"能力。
//! 默认使用 poppler 的 `pdftoppm`。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::RasterizeError;

/// 页面图片文件名前缀，`pdftoppm` 生成 `page-1.jpg` / `page-01.jpg`
const PAGE_PREFIX: &str = "page";

/// 页面图片所在目录
#[derive(Debug)]
enum PageDir {
    /// 随 [`RenderedPages`] 一起删除
    Temporary(TempDir),
    /// 保留在输出目录中
    Kept(PathBuf),
}

/// 渲染结果
///
/// 临时目录在本结构体销毁时删除。
#[derive(Debug)]
pub struct RenderedPages {
    pages: Vec<PathBuf>,
    dir: PageDir,
}

impl RenderedPages {
    /// 位于临时目录中的页面
    pub fn temporary(dir: TempDir, pages: Vec<PathBuf>) -> Self {
        Self {
            pages,
            dir: PageDir::Temporary(dir),
        }
    }

    /// 位于保留目录中的页面
    pub fn kept(dir: PathBuf, pages: Vec<PathBuf>) -> Self {
        Self {
            pages,
            dir: PageDir::Kept(dir),
        }
    }

    /// 按页码排序的页面图片
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn dir(&self) -> &Path {
        match &self.dir {
            PageDir::Temporary(dir) => dir.path(),
            PageDir::Kept(dir) => dir,
        }
    }

}

/// PDF → 页面图片
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, pdf_path: &Path, name: &str) -> Result<RenderedPages, RasterizeError>;
}

/// 基于 `pdftoppm` 的渲染器
pub struct PdfRasterizer {
    program: String,
    dpi: u32,
    keep_folder: Option<PathBuf>,
}

impl PdfRasterizer {
    /// 创建渲染器
    pub fn new(config: &Config) -> Self {
        Self {
            program: "pdftoppm".to_string(),
            dpi: config.pdf_dpi,
            keep_folder: config
                .keep_page_images
                .then(|| PathBuf::from(&config.page_image_folder)),
        }
    }

    /// 使用其他可执行文件（路径或名称）
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn prepare_dir(&self, name: &str) -> Result<PageDir, RasterizeError> {
        match &self.keep_folder {
            Some(folder) => {
                let dir = folder.join(name);
                tokio::fs::create_dir_all(&dir)
                    .await
                    .map_err(|source| RasterizeError::Io {
                        path: dir.display().to_string(),
                        source,
                    })?;
                remove_stale_pages(&dir).await?;
                Ok(PageDir::Kept(dir))
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix("grader-pages-")
                    .tempdir()
                    .map_err(|source| RasterizeError::Io {
                        path: std::env::temp_dir().display().to_string(),
                        source,
                    })?;
                Ok(PageDir::Temporary(dir))
            }
        }
    }
}

#[async_trait]
impl PageRenderer for PdfRasterizer {
    async fn render(&self, pdf_path: &Path, name: &str) -> Result<RenderedPages, RasterizeError> {
        let dir = self.prepare_dir(name).await?;
        let out_dir = match &dir {
            PageDir::Temporary(tmp) => tmp.path().to_path_buf(),
            PageDir::Kept(path) => path.clone(),
        };

        debug!(
            "执行 {} -r {} {} → {}",
            self.program,
            self.dpi,
            pdf_path.display(),
            out_dir.display()
        );

        let output = Command::new(&self.program)
            .arg("-jpeg")
            .arg("-jpegopt")
            .arg("quality=95")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf_path)
            .arg(out_dir.join(PAGE_PREFIX))
            .output()
            .await
            .map_err(|source| RasterizeError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RasterizeError::ConversionFailed {
                path: pdf_path.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let pages = collect_pages(&out_dir).await?;
        if pages.is_empty() {
            return Err(RasterizeError::NoPages {
                path: pdf_path.display().to_string(),
            });
        }

        info!("✓ PDF 渲染完成，共 {} 页", pages.len());

        Ok(RenderedPages { pages, dir })
    }
}

/// 收集目录中的页面图片，按页码排序
pub async fn collect_pages(dir: &Path) -> Result<Vec<PathBuf>, RasterizeError> {
    let io_error = |source| RasterizeError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut numbered = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;

    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let path = entry.path();
        let number = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(page_number);

        if let Some(number) = number {
            numbered.push((number, path));
        }
    }

    numbered.sort();
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

/// 删除保留目录中上一次渲染留下的页面图片，其他文件不动
async fn remove_stale_pages(dir: &Path) -> Result<(), RasterizeError> {
    let stale = collect_pages(dir).await?;
    if !stale.is_empty() {
        debug!("清理 {} 张旧页面图片: {}", stale.len(), dir.display());
    }

    for page in stale {
        tokio::fs::remove_file(&page)
            .await
            .map_err(|source| RasterizeError::Io {
                path: page.display().to_string(),
                source,
            })?;
    }
    Ok(())
}

/// 从 `page-07.jpg` 中取出页码 7
fn page_number(file_name: &str) -> Option<u32> {
    let stem = file_name
        .strip_suffix(".jpg")
        .or_else(|| file_name.strip_suffix(".jpeg"))?;
    let digits = stem.strip_prefix(PAGE_PREFIX)?.strip_prefix('-')?;
    digits.parse().ok()
}
