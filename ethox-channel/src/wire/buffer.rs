use core::ops;

/// An owned, contiguous sequence of bytes.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Default)]
pub struct View(Vec<u8>);

/// A sequence of views making up one logical byte sequence.
///
/// Packets are often assembled from several buffers, a header in front of a payload for example.
/// This avoids copying them into one allocation until someone actually needs that.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct VectorisedView {
    views: Vec<View>,
    size: usize,
}

/// The buffers of a single packet.
///
/// The header is the part prepended by the layers above the link while the data is whatever
/// payload they were handed. A raw packet has an empty header.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PacketBuffer {
    /// Headers prepended by upper layers.
    pub header: View,
    /// The payload.
    pub data: VectorisedView,
}

impl View {
    /// Copy bytes into a new view.
    pub fn from_bytes(data: &[u8]) -> Self {
        View(data.to_vec())
    }

    /// Unwrap the owned bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Convert into a vectorised view with this as the only segment.
    pub fn to_vectorised_view(self) -> VectorisedView {
        VectorisedView::from(self)
    }
}

impl From<Vec<u8>> for View {
    fn from(data: Vec<u8>) -> Self {
        View(data)
    }
}

impl ops::Deref for View {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for View {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl VectorisedView {
    /// Create a view from segments.
    pub fn new(views: Vec<View>) -> Self {
        let size = views.iter().map(|view| view.len()).sum();
        VectorisedView { views, size }
    }

    /// The total number of bytes in all segments.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Query whether there are no bytes at all, regardless of the number of segments.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The segments, in order.
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Append a segment.
    pub fn append_view(&mut self, view: View) {
        self.size += view.len();
        self.views.push(view);
    }

    /// Flatten all segments into one contiguous view.
    ///
    /// Does not copy if there is at most one segment.
    pub fn to_view(&self) -> View {
        match self.views.as_slice() {
            [] => View::default(),
            [single] => single.clone(),
            views => {
                let mut flat = Vec::with_capacity(self.size);
                views.iter().for_each(|view| flat.extend_from_slice(view));
                View(flat)
            }
        }
    }
}

impl From<View> for VectorisedView {
    fn from(view: View) -> Self {
        VectorisedView { size: view.len(), views: vec![view] }
    }
}

impl From<Vec<u8>> for VectorisedView {
    fn from(data: Vec<u8>) -> Self {
        View::from(data).into()
    }
}

impl PacketBuffer {
    /// A packet consisting only of payload data.
    pub fn from_data(data: impl Into<VectorisedView>) -> Self {
        PacketBuffer {
            header: View::default(),
            data: data.into(),
        }
    }

    /// The total length of header and data.
    pub fn size(&self) -> usize {
        self.header.len() + self.data.size()
    }

    /// Concatenate header and data into one buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut flat = Vec::with_capacity(self.size());
        flat.extend_from_slice(&self.header);
        self.data.views().iter().for_each(|view| flat.extend_from_slice(view));
        flat
    }
}
