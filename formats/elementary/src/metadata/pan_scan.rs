use codec_h264::sei::pan_scan::PanScanRect;

/// `None` is an unbounded timestamp, it compares after every `Some`.
fn before(ts: Option<i64>, bound: Option<i64>) -> bool {
    match (ts, bound) {
        (Some(ts), Some(bound)) => ts < bound,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

#[derive(Debug, Clone, Default)]
struct PanScanNode {
    rect: PanScanRect,
    /// `None` until the access unit carrying the record is timestamped
    start_ts: Option<i64>,
    /// exclusive, `None` is unbounded
    end_ts: Option<i64>,
    /// shown at least once
    active: bool,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
struct IndexList {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl IndexList {
    fn push_back(&mut self, nodes: &mut [PanScanNode], index: usize) {
        nodes[index].prev = self.tail;
        nodes[index].next = None;
        match self.tail {
            Some(tail) => nodes[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
    }

    fn unlink(&mut self, nodes: &mut [PanScanNode], index: usize) {
        let (prev, next) = (nodes[index].prev, nodes[index].next);
        match prev {
            Some(prev) => nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => nodes[next].prev = prev,
            None => self.tail = prev,
        }
        nodes[index].prev = None;
        nodes[index].next = None;
        self.len -= 1;
    }

    fn pop_front(&mut self, nodes: &mut [PanScanNode]) -> Option<usize> {
        let head = self.head?;
        self.unlink(nodes, head);
        Some(head)
    }
}

/// Fixed pool of pan-scan records.
///
/// Records move between a free list and a used list ordered by start
/// timestamp. A record is written when its SEI is parsed, stamped with the
/// timestamp of its access unit, and shown until its repetition period runs
/// out or the next record takes over.
#[derive(Debug)]
pub struct PanScanSchedule {
    nodes: Vec<PanScanNode>,
    free: IndexList,
    used: IndexList,
}

impl PanScanSchedule {
    pub fn new(capacity: usize) -> Self {
        let mut schedule = Self {
            nodes: vec![PanScanNode::default(); capacity],
            free: IndexList::default(),
            used: IndexList::default(),
        };
        schedule.reset();
        schedule
    }

    pub fn reset(&mut self) {
        self.free = IndexList::default();
        self.used = IndexList::default();
        for index in 0..self.nodes.len() {
            self.nodes[index] = PanScanNode::default();
            self.free.push_back(&mut self.nodes, index);
        }
    }

    pub fn used_len(&self) -> usize {
        self.used.len
    }

    pub fn free_len(&self) -> usize {
        self.free.len
    }

    /// Hands out a blank record at the end of the used list. A record not
    /// stamped yet belongs to the same access unit and is overwritten.
    pub fn get_free(&mut self) -> Option<&mut PanScanRect> {
        let index = match self.used.tail {
            Some(tail) if self.nodes[tail].start_ts.is_none() => {
                self.used.unlink(&mut self.nodes, tail);
                tail
            }
            _ => match self.free.pop_front(&mut self.nodes) {
                Some(index) => index,
                None => {
                    tracing::warn!(
                        "pan scan pool of {} records exhausted, record dropped",
                        self.nodes.len()
                    );
                    return None;
                }
            },
        };
        let node = &mut self.nodes[index];
        node.rect = PanScanRect::none();
        node.start_ts = None;
        node.end_ts = None;
        node.active = false;
        self.used.push_back(&mut self.nodes, index);
        Some(&mut self.nodes[index].rect)
    }

    /// Stamps the newest record with the timestamp of its access unit and
    /// closes the display window of the one before it.
    pub fn update_last(&mut self, ts: Option<i64>) {
        let Some(tail) = self.used.tail else {
            return;
        };
        if self.nodes[tail].start_ts.is_some() {
            return;
        }
        self.nodes[tail].start_ts = ts;
        let Some(prev) = self.nodes[tail].prev else {
            return;
        };
        let prev = &mut self.nodes[prev];
        if before(ts, prev.end_ts) {
            prev.end_ts = ts;
        } else if ts.is_none() {
            prev.rect.repetition_period = 0;
        }
    }

    /// The record to show with the frame at `frame_ts`. Expired records are
    /// recycled on the way, and the returned one uses up one display.
    pub fn get_populated(&mut self, frame_ts: Option<i64>) -> Option<PanScanRect> {
        let mut cursor = self.used.head;
        let mut found = None;
        while let Some(index) = cursor {
            let next = self.nodes[index].next;
            let node = &mut self.nodes[index];
            let (Some(start), Some(ts)) = (node.start_ts, frame_ts) else {
                found = Some(index);
                break;
            };
            let start = if node.active && ts < start {
                // timestamps went backwards while the record was on screen
                node.start_ts = Some(ts);
                ts
            } else {
                start
            };
            if ts < start {
                break;
            }
            if before(Some(ts), node.end_ts) {
                found = Some(index);
                break;
            }
            tracing::trace!("pan scan record expired at {}", ts);
            self.used.unlink(&mut self.nodes, index);
            self.free.push_back(&mut self.nodes, index);
            cursor = next;
        }

        let index = found?;
        let node = &mut self.nodes[index];
        node.active = true;
        let rect = node.rect.clone();
        if !node.rect.decay() {
            self.used.unlink(&mut self.nodes, index);
            self.free.push_back(&mut self.nodes, index);
        }
        Some(rect)
    }
}
