//! Least Recently Used (LRU) Eviction List.
//!
//! A doubly linked list of index tokens (`0..capacity`), stored as an array of links
//! rather than heap nodes. The front of the list is the next eviction victim and the
//! back is the most recently used entry. A fully associative structure keeps one token
//! per entry in the list and moves a token to the back whenever its entry is used.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `push_back()`, `push_front()`, `pop_back()`, `pop_front()`: O(1)
//!   - `move_to_back()`: O(1)
//!   - `front()`: O(1)
//! - **Space Complexity:** O(N) where N is the number of tokens
//! - **Best Case:** Workloads with strong temporal locality
//! - **Worst Case:** Cyclic scans one larger than the capacity (every access misses)

use crate::common::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

/// Ordered list of tokens supporting O(1) touch and O(1) victim lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvictionList {
    links: Vec<Link>,
    front: Option<usize>,
    back: Option<usize>,
    len: usize,
}

impl EvictionList {
    /// Creates an empty list able to hold tokens `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: vec![Link::default(); capacity],
            front: None,
            back: None,
            len: 0,
        }
    }

    /// Creates a list holding every token `0..len`, with `0` at the front.
    pub fn new(len: usize) -> Self {
        let mut list = Self::with_capacity(len);
        for token in 0..len {
            list.link_back(token);
        }
        list
    }

    /// Largest token count the list can hold.
    pub fn capacity(&self) -> usize {
        self.links.len()
    }

    /// Number of tokens currently in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The next eviction victim.
    pub fn front(&self) -> Option<usize> {
        self.front
    }

    /// The most recently used token.
    pub fn back(&self) -> Option<usize> {
        self.back
    }

    /// Returns `true` if `token` is currently in the list.
    pub fn contains(&self, token: usize) -> bool {
        self.links.get(token).is_some_and(|link| link.linked)
    }

    /// Appends `token` at the most recently used end.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if the token is out of range or already present.
    pub fn push_back(&mut self, token: usize) -> Result<()> {
        self.check_free(token)?;
        self.link_back(token);
        Ok(())
    }

    /// Prepends `token` at the eviction end.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if the token is out of range or already present.
    pub fn push_front(&mut self, token: usize) -> Result<()> {
        self.check_free(token)?;
        self.links[token] = Link {
            prev: None,
            next: self.front,
            linked: true,
        };
        match self.front {
            Some(old) => self.links[old].prev = Some(token),
            None => self.back = Some(token),
        }
        self.front = Some(token);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the most recently used token.
    pub fn pop_back(&mut self) -> Option<usize> {
        let token = self.back?;
        self.unlink(token);
        Some(token)
    }

    /// Removes and returns the eviction victim.
    pub fn pop_front(&mut self) -> Option<usize> {
        let token = self.front?;
        self.unlink(token);
        Some(token)
    }

    /// Marks `token` as most recently used.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if the token is not in the list.
    pub fn move_to_back(&mut self, token: usize) -> Result<()> {
        if !self.contains(token) {
            return Err(Error::BadParameter(format!(
                "token {token} is not in the eviction list"
            )));
        }
        if self.back != Some(token) {
            self.unlink(token);
            self.link_back(token);
        }
        Ok(())
    }

    /// Iterates from the eviction victim (front) to the most recently used (back).
    /// Reverse with `.rev()`.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            front: self.front,
            back: self.back,
            remaining: self.len,
        }
    }

    fn check_free(&self, token: usize) -> Result<()> {
        if token >= self.links.len() {
            return Err(Error::BadParameter(format!(
                "token {token} exceeds eviction list capacity {}",
                self.links.len()
            )));
        }
        if self.links[token].linked {
            return Err(Error::BadParameter(format!(
                "token {token} is already in the eviction list"
            )));
        }
        Ok(())
    }

    fn link_back(&mut self, token: usize) {
        self.links[token] = Link {
            prev: self.back,
            next: None,
            linked: true,
        };
        match self.back {
            Some(old) => self.links[old].next = Some(token),
            None => self.front = Some(token),
        }
        self.back = Some(token);
        self.len += 1;
    }

    fn unlink(&mut self, token: usize) {
        let Link { prev, next, .. } = self.links[token];
        match prev {
            Some(p) => self.links[p].next = next,
            None => self.front = next,
        }
        match next {
            Some(n) => self.links[n].prev = prev,
            None => self.back = prev,
        }
        self.links[token] = Link::default();
        self.len -= 1;
    }
}

impl<'a> IntoIterator for &'a EvictionList {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-back iterator over an [`EvictionList`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    list: &'a EvictionList,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let token = self.front?;
        self.front = self.list.links[token].next;
        self.remaining -= 1;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let token = self.back?;
        self.back = self.list.links[token].prev;
        self.remaining -= 1;
        Some(token)
    }
}

impl ExactSizeIterator for Iter<'_> {}
