use crate::error::Error;
use crate::gl842::registers::BULK_READ_ADDRESS;
use crate::properties::Model;
use crate::session::ScanSession;
use crate::transport::Transport;
use genesys_types::ColorOrder;
use genesys_types::Image;
use genesys_types::PixelFormat;

pub mod buffer;

macro_rules! register {
    ($($module:ident),+) => {
        paste::paste! {
            $(
                pub mod $module;
            )+

            /// Row producer, pulls its input from the nodes before it.
            pub enum Node {
                $(
                    [<$module:camel>]($module::Node),
                )+
            }

            $(
                impl From<$module::Node> for Node {
                    fn from(node: $module::Node) -> Self {
                        Self::[<$module:camel>](node)
                    }
                }
            )+

            impl std::fmt::Display for Node {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    match self {
                        $(
                            Self::[<$module:camel>](_) => write!(formatter, stringify!($module)),
                        )+
                    }
                }
            }

            impl Node {
                pub fn width(&self) -> usize {
                    match self {
                        $(
                            Self::[<$module:camel>](node) => node.width(),
                        )+
                    }
                }

                pub fn height(&self) -> usize {
                    match self {
                        $(
                            Self::[<$module:camel>](node) => node.height(),
                        )+
                    }
                }

                pub fn format(&self) -> PixelFormat {
                    match self {
                        $(
                            Self::[<$module:camel>](node) => node.format(),
                        )+
                    }
                }

                pub fn row_bytes(&self) -> usize {
                    match self {
                        $(
                            Self::[<$module:camel>](node) => node.row_bytes(),
                        )+
                    }
                }

                fn eof(&self, upstream: &[Node]) -> bool {
                    match self {
                        $(
                            Self::[<$module:camel>](node) => node.eof(upstream),
                        )+
                    }
                }

                /// Writes exactly [`Node::row_bytes`] bytes to `out`.
                fn get_next_row_data(
                    &mut self,
                    upstream: &mut [Node],
                    out: &mut [u8],
                ) -> Result<(), Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](node) => node.get_next_row_data(upstream, out),
                        )+
                    }
                }
            }
        }
    };
}

register! {
    array_source,
    buffered_callable_source,
    buffered_genesys_usb_source,
    format_convert,
    desegment,
    merge_mono_lines,
    split_mono_lines,
    component_shift_lines,
    pixel_shift_lines,
    extract
}

/// Pulls the next row of the last node in `nodes`.
pub(crate) fn next_row(nodes: &mut [Node], out: &mut [u8]) -> Result<(), Error> {
    match nodes.split_last_mut() {
        Some((node, upstream)) => {
            let row_bytes = node.row_bytes();
            node.get_next_row_data(upstream, &mut out[..row_bytes])
        }
        None => Err(Error::EmptyPipeline),
    }
}

pub(crate) fn eof(nodes: &[Node]) -> bool {
    match nodes.split_last() {
        Some((node, upstream)) => node.eof(upstream),
        None => true,
    }
}

pub(crate) fn row_bytes(format: PixelFormat, width: usize) -> Result<usize, Error> {
    Ok(genesys_types::get_pixel_row_bytes(format, width)?)
}

/// Chain of nodes, the first one is the source.
#[derive(Default)]
pub struct Stack {
    nodes: Vec<Node>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn push_source<IntoNode>(&mut self, node: IntoNode) -> Result<(), Error>
    where
        IntoNode: Into<Node>,
    {
        if !self.nodes.is_empty() {
            return Err(Error::PipelineNotEmpty);
        }
        self.nodes.push(node.into());
        Ok(())
    }

    /// Appends the node built by `build` from the current output node.
    pub fn push_node<IntoNode, Build>(&mut self, build: Build) -> Result<(), Error>
    where
        IntoNode: Into<Node>,
        Build: FnOnce(&Node) -> Result<IntoNode, Error>,
    {
        let node = build(self.back()?)?.into();
        tracing::trace!(
            node = %node,
            width = node.width(),
            height = node.height(),
            format = ?node.format(),
            "push pipeline node"
        );
        self.nodes.push(node);
        Ok(())
    }

    fn front(&self) -> Result<&Node, Error> {
        self.nodes.first().ok_or(Error::EmptyPipeline)
    }

    fn back(&self) -> Result<&Node, Error> {
        self.nodes.last().ok_or(Error::EmptyPipeline)
    }

    pub fn input_width(&self) -> Result<usize, Error> {
        Ok(self.front()?.width())
    }

    pub fn input_height(&self) -> Result<usize, Error> {
        Ok(self.front()?.height())
    }

    pub fn input_format(&self) -> Result<PixelFormat, Error> {
        Ok(self.front()?.format())
    }

    pub fn input_row_bytes(&self) -> Result<usize, Error> {
        Ok(self.front()?.row_bytes())
    }

    pub fn output_width(&self) -> Result<usize, Error> {
        Ok(self.back()?.width())
    }

    pub fn output_height(&self) -> Result<usize, Error> {
        Ok(self.back()?.height())
    }

    pub fn output_format(&self) -> Result<PixelFormat, Error> {
        Ok(self.back()?.format())
    }

    pub fn output_row_bytes(&self) -> Result<usize, Error> {
        Ok(self.back()?.row_bytes())
    }

    pub fn eof(&self) -> bool {
        eof(&self.nodes)
    }

    pub fn get_next_row_data(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let row_bytes = self.output_row_bytes()?;
        if out.len() < row_bytes {
            return Err(Error::ArrayTooSmall {
                length: out.len(),
                required: row_bytes,
            });
        }
        next_row(&mut self.nodes, out)
    }

    /// Reads every remaining output row.
    pub fn get_all_data(&mut self) -> Result<Vec<u8>, Error> {
        let row_bytes = self.output_row_bytes()?;
        let height = self.output_height()?;
        let mut data = vec![0u8; row_bytes * height];
        for row in data.chunks_exact_mut(row_bytes.max(1)) {
            next_row(&mut self.nodes, row)?;
        }
        Ok(data)
    }

    pub fn get_image(&mut self) -> Result<Image, Error> {
        let width = self.output_width()?;
        let height = self.output_height()?;
        let format = self.output_format()?;
        let data = self.get_all_data()?;
        Ok(Image::from_data(width, height, format, data)?)
    }
}

/// Pipeline that turns the raw ASIC stream of `session` into rows of
/// `requested_pixels` by `lines`.
pub fn build_image_pipeline(
    model: &'static Model,
    session: &ScanSession,
    transport: std::sync::Arc<dyn Transport>,
) -> Result<Stack, Error> {
    session.assert_computed()?;
    let params = &session.params;
    let depth = params.depth as usize;
    let channels = params.channels as usize;
    let interleaved_lines = session.interleaved_lines.max(1) as usize;
    let source_format = genesys_types::create_pixel_format(
        depth,
        if model.is_cis { 1 } else { channels },
        model.line_mode_color_order,
    )?;
    let mut stack = Stack::new();
    stack.push_source(buffered_genesys_usb_source::Node::new(
        session.output_pixels as usize / interleaved_lines,
        session.optical_line_count as usize * interleaved_lines,
        source_format,
        session.output_total_bytes_raw as usize,
        session.buffer_size_read,
        Box::new(move |data: &mut [u8]| transport.bulk_read_data(BULK_READ_ADDRESS, data)),
    )?)?;
    if session.segment_count > 1 {
        stack.push_node(|source| {
            desegment::Node::new(
                source,
                source.width(),
                &session.segment_order,
                session.conseq_pixel_dist as usize,
                1,
                1,
            )
        })?;
    }
    if interleaved_lines > 1 {
        stack.push_node(|source| desegment::Node::deinterleave_lines(source, interleaved_lines, 1))?;
    }
    if model.is_cis && channels == 3 {
        stack.push_node(|source| merge_mono_lines::Node::new(source, model.line_mode_color_order))?;
    }
    if stack.output_format()?.color_order()? == ColorOrder::Bgr {
        let format = genesys_types::create_pixel_format(depth, 3, ColorOrder::Rgb)?;
        stack.push_node(|source| format_convert::Node::new(source, format))?;
    }
    if session.max_color_shift_lines > 0 && channels == 3 {
        stack.push_node(|source| {
            component_shift_lines::Node::new(
                source,
                session.color_shift_lines_r as usize,
                session.color_shift_lines_g as usize,
                session.color_shift_lines_b as usize,
            )
        })?;
    }
    if !session.stagger_y_shifts.is_empty() {
        stack.push_node(|source| pixel_shift_lines::Node::new(source, &session.stagger_y_shifts))?;
    }
    stack.push_node(|source| {
        extract::Node::new(
            source,
            0,
            0,
            params.get_requested_pixels() as usize,
            params.lines as usize,
        )
    })?;
    tracing::debug!(
        nodes = stack.len(),
        width = stack.output_width()?,
        height = stack.output_height()?,
        "built image pipeline"
    );
    Ok(stack)
}
