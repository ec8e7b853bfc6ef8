//! 把截图追加到已有 PDF 的末尾

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;
use tracing::debug;

use crate::error::AppResult;

/// 页面找不到 MediaBox 时使用 US Letter
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);
/// 图片距页面边缘的距离 (pt)
const PAGE_MARGIN: f32 = 36.0;
const IMAGE_RESOURCE_NAME: &str = "RobotImg";

/// 图片在页面上的位置和尺寸 (PDF 坐标，原点在左下角)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// 水平居中、贴顶边距放置；只缩小不放大
pub fn place_centered(page_width: f32, page_height: f32, img_width: f32, img_height: f32) -> Placement {
    let max_width = (page_width - 2.0 * PAGE_MARGIN).max(1.0);
    let max_height = (page_height - 2.0 * PAGE_MARGIN).max(1.0);
    let scale = (max_width / img_width).min(max_height / img_height).min(1.0);

    let width = img_width * scale;
    let height = img_height * scale;
    Placement {
        x: (page_width - width) / 2.0,
        y: page_height - PAGE_MARGIN - height,
        width,
        height,
    }
}

/// 把 PNG 作为新的一页追加到 PDF，原地覆盖写回
pub fn embed_image(image_path: &Path, pdf_path: &Path) -> AppResult<()> {
    let rgb = image::open(image_path)?.to_rgb8();
    let (img_width, img_height) = rgb.dimensions();

    let mut doc = Document::load(pdf_path)?;
    let pages_id = doc.catalog()?.get(b"Pages")?.as_reference()?;
    let (page_width, page_height) = last_page_size(&doc);

    let mut image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => img_width as i64,
            "Height" => img_height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb.into_raw(),
    );
    image_stream.compress()?;
    let image_id = doc.add_object(image_stream);

    let placement = place_centered(page_width, page_height, img_width as f32, img_height as f32);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { IMAGE_RESOURCE_NAME => image_id },
        },
    });
    append_page(&mut doc, pages_id, page_id)?;

    doc.save(pdf_path)?;
    debug!(
        "已将 {} ({}x{}) 追加到 {}",
        image_path.display(),
        img_width,
        img_height,
        pdf_path.display()
    );
    Ok(())
}

fn append_page(doc: &mut Document, pages_id: ObjectId, page_id: ObjectId) -> AppResult<()> {
    let pages = doc.get_object_mut(pages_id)?.as_dict_mut()?;
    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages.get_mut(b"Kids")?.as_array_mut()?.push(page_id.into());
    pages.set("Count", count + 1);
    Ok(())
}

fn last_page_size(doc: &Document) -> (f32, f32) {
    doc.get_pages()
        .values()
        .last()
        .and_then(|id| doc.get_object(*id).ok())
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|page| page.get(b"MediaBox").ok())
        .and_then(|obj| obj.as_array().ok())
        .and_then(|mb| {
            let nums: Vec<f32> = mb.iter().filter_map(|o| o.as_float().ok()).collect();
            match nums.as_slice() {
                [x0, y0, x1, y1] => Some((x1 - x0, y1 - y0)),
                _ => None,
            }
        })
        .unwrap_or(DEFAULT_PAGE_SIZE)
}
