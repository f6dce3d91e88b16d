//! Fixed color palette shared by keypoint classes and skeleton instances.

/// Colors assigned by index to keypoint classes without a fixed color, and
/// cycled through when skeletons get unique colors.
pub const COLORS: [&str; 30] = [
    "#2CA02C", "#1F77B4", "#FF7F0E", "#D62728", "#9467BD", "#8C564B", "#E377C2", "#7F7F7F",
    "#BCBC22", "#FF9896", "#17BECF", "#AEC7E8", "#FFBB78", "#98DF8A", "#C5B0D5", "#C49C94",
    "#F7B6D2", "#C7C7C7", "#DBDB8D", "#9EDAE5", "#393B79", "#5254A3", "#6B6ECF", "#9C9EDE",
    "#637939", "#8CA252", "#B5CF6B", "#CEDB9C", "#F1EEF6", "#E31A1C",
];

/// Palette color for an index, wrapping around the palette length.
pub fn palette_color(index: usize) -> &'static str {
    COLORS[index % COLORS.len()]
}
