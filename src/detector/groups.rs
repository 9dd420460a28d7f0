use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub id: u32,
    pub lo: usize,
    pub hi: usize,
}

impl Group {
    pub fn bins(&self) -> RangeInclusive<usize> {
        self.lo..=self.hi
    }

    pub fn width(&self) -> usize {
        self.hi - self.lo + 1
    }
}

/// Ids run from 1 upwards in frequency order; 0 marks an ungrouped bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMap {
    ids: Vec<u32>,
    groups: Vec<Group>,
}

impl GroupMap {
    pub fn assemble(counts: &[u32]) -> Self {
        let mut ids = vec![0; counts.len()];
        let mut groups: Vec<Group> = Vec::new();

        let mut i = 0;
        while i < counts.len() {
            if counts[i] == 0 {
                i += 1;
                continue;
            }
            let id = groups.len() as u32 + 1;
            let lo = i;
            while i < counts.len() && counts[i] > 0 {
                ids[i] = id;
                i += 1;
            }
            groups.push(Group { id, lo, hi: i - 1 });
        }

        Self { ids, groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_of(&self, bin: usize) -> u32 {
        self.ids[bin]
    }
}
