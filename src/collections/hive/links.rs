//! Block records and their three membership lists.
//!
//! Every block of a hive lives in one [`BlockArena`] and is addressed by a
//! [`BlockId`]. Node 0 is the sentinel head: it carries no block and closes
//! each of the three lists ([`List::Active`], [`List::Open`],
//! [`List::Reserved`]) into a ring, so list surgery never has a null case.
//! The head is created lazily with the first block.
//!
//! Structure-of-arrays layout:
//! - `links`: three `(prev, next)` pairs per node, one per list. A node that
//!   is not on a list has both ends pointing at itself.
//! - `nodes`: the block records (or the head, or a vacant record waiting on
//!   the arena free list).

use super::block::Block;

/// Index of a node in a [`BlockArena`].
pub(crate) type BlockId = u32;

/// The sentinel node.
pub(crate) const HEAD: BlockId = 0;

/// The membership lists a block can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum List {
    /// Blocks holding at least one element, in activation order.
    Active = 0,
    /// Blocks with at least one free slot.
    Open = 1,
    /// Empty blocks kept as spare capacity.
    Reserved = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    prev: BlockId,
    next: BlockId,
}

impl Link {
    const fn detached(id: BlockId) -> Self {
        Self { prev: id, next: id }
    }
}

enum Node<T> {
    Head,
    Block(Block<T>),
    Vacant(Option<BlockId>),
}

pub(crate) struct BlockArena<T> {
    links: Vec<[Link; 3]>,
    nodes: Vec<Node<T>>,
    free_head: Option<BlockId>,
    len: usize,
}

impl<T> BlockArena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            links: Vec::new(),
            nodes: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Number of live blocks.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn has_head(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn ensure_head(&mut self) {
        if !self.has_head() {
            self.nodes.push(Node::Head);
            self.links.push([Link::detached(HEAD); 3]);
        }
    }

    /// Adopts `block` and returns its id. The block starts on no list.
    pub(crate) fn insert(&mut self, block: Block<T>) -> BlockId {
        self.ensure_head();
        self.len += 1;

        if let Some(id) = self.free_head {
            let slot = &mut self.nodes[id as usize];
            self.free_head = match slot {
                Node::Vacant(next) => *next,
                _ => panic!("Corrupted block free list"),
            };
            *slot = Node::Block(block);
            self.links[id as usize] = [Link::detached(id); 3];
            id
        } else {
            let id = BlockId::try_from(self.nodes.len()).expect("block arena exhausted");
            self.nodes.push(Node::Block(block));
            self.links.push([Link::detached(id); 3]);
            id
        }
    }

    /// Releases the record of `id`, which must be on no list.
    pub(crate) fn remove(&mut self, id: BlockId) -> Block<T> {
        debug_assert!(
            !self.is_linked(List::Active, id)
                && !self.is_linked(List::Open, id)
                && !self.is_linked(List::Reserved, id),
            "removing a block that is still linked"
        );
        let old = core::mem::replace(&mut self.nodes[id as usize], Node::Vacant(self.free_head));
        match old {
            Node::Block(block) => {
                self.free_head = Some(id);
                self.len -= 1;
                block
            }
            other => {
                self.nodes[id as usize] = other;
                panic!("block {id} is not live");
            }
        }
    }

    /// The block behind `id`, if it is live.
    #[inline]
    pub(crate) fn try_block(&self, id: BlockId) -> Option<&Block<T>> {
        match self.nodes.get(id as usize) {
            Some(Node::Block(block)) => Some(block),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn try_block_mut(&mut self, id: BlockId) -> Option<&mut Block<T>> {
        match self.nodes.get_mut(id as usize) {
            Some(Node::Block(block)) => Some(block),
            _ => None,
        }
    }

    /// Ids of every live block, in arena order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Node::Block(_)))
            .map(|(id, _)| id as BlockId)
    }

    /// The block behind `id`.
    ///
    /// # Panics
    /// Panics if `id` does not name a live block.
    #[inline]
    pub(crate) fn block(&self, id: BlockId) -> &Block<T> {
        self.try_block(id)
            .unwrap_or_else(|| panic!("hive position refers to no live block ({id})"))
    }

    #[inline]
    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block<T> {
        match self.nodes.get_mut(id as usize) {
            Some(Node::Block(block)) => block,
            _ => panic!("hive position refers to no live block ({id})"),
        }
    }

    #[inline]
    fn link(&self, list: List, id: BlockId) -> Link {
        self.links[id as usize][list as usize]
    }

    #[inline]
    fn link_mut(&mut self, list: List, id: BlockId) -> &mut Link {
        &mut self.links[id as usize][list as usize]
    }

    /// Returns `true` if `id` is currently on `list`.
    #[inline]
    pub(crate) fn is_linked(&self, list: List, id: BlockId) -> bool {
        self.link(list, id).next != id
    }

    fn link_between(&mut self, list: List, id: BlockId, prev: BlockId, next: BlockId) {
        debug_assert!(id != HEAD && !self.is_linked(list, id));
        *self.link_mut(list, id) = Link { prev, next };
        self.link_mut(list, prev).next = id;
        self.link_mut(list, next).prev = id;
    }

    /// Appends `id` to the tail of `list`.
    pub(crate) fn push_back(&mut self, list: List, id: BlockId) {
        let tail = self.link(list, HEAD).prev;
        self.link_between(list, id, tail, HEAD);
    }

    /// Prepends `id` to the front of `list`.
    pub(crate) fn push_front(&mut self, list: List, id: BlockId) {
        let front = self.link(list, HEAD).next;
        self.link_between(list, id, HEAD, front);
    }

    /// Takes `id` off `list`.
    pub(crate) fn unlink(&mut self, list: List, id: BlockId) {
        debug_assert!(self.is_linked(list, id), "unlinking a block that is not on {list:?}");
        let Link { prev, next } = self.link(list, id);
        self.link_mut(list, prev).next = next;
        self.link_mut(list, next).prev = prev;
        *self.link_mut(list, id) = Link::detached(id);
    }

    /// Front of `list`.
    #[inline]
    pub(crate) fn first(&self, list: List) -> Option<BlockId> {
        if !self.has_head() {
            return None;
        }
        let next = self.link(list, HEAD).next;
        (next != HEAD).then_some(next)
    }

    /// Tail of `list`.
    #[inline]
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn last(&self, list: List) -> Option<BlockId> {
        if !self.has_head() {
            return None;
        }
        let prev = self.link(list, HEAD).prev;
        (prev != HEAD).then_some(prev)
    }

    /// Successor of `id` on `list`; `None` at the sentinel.
    #[inline]
    pub(crate) fn next(&self, list: List, id: BlockId) -> Option<BlockId> {
        let next = self.link(list, id).next;
        (next != HEAD).then_some(next)
    }

    /// Block ids on `list`, front to back.
    pub(crate) fn iter(&self, list: List) -> ListIter<'_, T> {
        ListIter {
            arena: self,
            list,
            current: self.first(list),
        }
    }
}

/// Iterator over the ids on one list.
pub(crate) struct ListIter<'a, T> {
    arena: &'a BlockArena<T>,
    list: List,
    current: Option<BlockId>,
}

impl<T> Iterator for ListIter<'_, T> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        let id = self.current?;
        self.current = self.arena.next(self.list, id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::Global;

    fn arena_with(n: usize) -> (BlockArena<u8>, Vec<BlockId>) {
        let mut arena = BlockArena::new();
        let ids = (0..n)
            .map(|_| arena.insert(Block::allocate(&Global, 4).unwrap()))
            .collect();
        (arena, ids)
    }

    fn release(mut arena: BlockArena<u8>) {
        let ids: Vec<_> = (1..arena.nodes.len() as BlockId)
            .filter(|&id| arena.try_block(id).is_some())
            .collect();
        for id in ids {
            for list in [List::Active, List::Open, List::Reserved] {
                if arena.is_linked(list, id) {
                    arena.unlink(list, id);
                }
            }
            arena.remove(id).deallocate(&Global);
        }
    }

    #[test]
    fn empty_arena_has_no_head() {
        let arena: BlockArena<u8> = BlockArena::new();
        assert_eq!(arena.first(List::Active), None);
        assert_eq!(arena.iter(List::Reserved).count(), 0);
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn ids_start_after_the_sentinel() {
        let (arena, ids) = arena_with(3);
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(arena.len(), 3);
        release(arena);
    }

    #[test]
    fn push_back_and_front_order() {
        let (mut arena, ids) = arena_with(3);
        arena.push_back(List::Active, ids[0]);
        arena.push_back(List::Active, ids[1]);
        arena.push_front(List::Active, ids[2]);
        assert_eq!(arena.iter(List::Active).collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(arena.first(List::Active), Some(3));
        assert_eq!(arena.last(List::Active), Some(2));
        release(arena);
    }

    #[test]
    fn lists_are_independent() {
        let (mut arena, ids) = arena_with(2);
        arena.push_back(List::Open, ids[0]);
        arena.push_back(List::Open, ids[1]);
        arena.push_front(List::Reserved, ids[1]);
        arena.unlink(List::Open, ids[1]);

        assert!(arena.is_linked(List::Reserved, ids[1]));
        assert!(!arena.is_linked(List::Open, ids[1]));
        assert!(!arena.is_linked(List::Active, ids[0]));
        assert_eq!(arena.iter(List::Open).collect::<Vec<_>>(), vec![ids[0]]);
        release(arena);
    }

    #[test]
    fn unlinking_the_only_member_empties_the_ring() {
        let (mut arena, ids) = arena_with(1);
        arena.push_back(List::Reserved, ids[0]);
        arena.unlink(List::Reserved, ids[0]);
        assert_eq!(arena.first(List::Reserved), None);
        assert_eq!(arena.last(List::Reserved), None);
        release(arena);
    }

    #[test]
    fn removed_records_are_reused() {
        let (mut arena, ids) = arena_with(3);
        arena.remove(ids[1]).deallocate(&Global);
        assert!(arena.try_block(ids[1]).is_none());
        let id = arena.insert(Block::allocate(&Global, 4).unwrap());
        assert_eq!(id, ids[1]);
        assert_eq!(arena.len(), 3);
        release(arena);
    }
}
