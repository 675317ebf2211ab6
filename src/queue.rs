//! Очередь с приоритетами на корзинах
//!
//! Приоритеты поиска — небольшие неотрицательные целые (расстояние плюс эвристика),
//! поэтому вместо двоичной кучи используется массив корзин. Узлы одного приоритета
//! связаны в односвязную цепочку, ссылка на следующий узел хранится в самом узле.

/// Узел, который можно положить в [`PriorityBucketQueue`]
pub trait BucketNode {
    fn search_priority(&self) -> usize;
    fn next_with_same_priority(&self) -> Option<usize>;
    fn set_next_with_same_priority(&mut self, next: Option<usize>);
}

/// Очередь индексов узлов, упорядоченная по [`BucketNode::search_priority`].
///
/// Сами узлы живут снаружи (в арене), очередь хранит только головы цепочек.
/// Курсор минимума в пределах одного поиска только растёт, поэтому извлечение
/// амортизированно O(1).
#[derive(Debug, Clone)]
pub struct PriorityBucketQueue {
    buckets: Vec<Option<usize>>,
    count: usize,
    minimum: usize,
}

impl Default for PriorityBucketQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityBucketQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            count: 0,
            minimum: usize::MAX,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn enqueue<N: BucketNode>(&mut self, nodes: &mut [N], node: usize) {
        self.count += 1;
        let priority = nodes[node].search_priority();
        if priority < self.minimum {
            self.minimum = priority;
        }
        if priority >= self.buckets.len() {
            self.buckets.resize(priority + 1, None);
        }
        nodes[node].set_next_with_same_priority(self.buckets[priority]);
        self.buckets[priority] = Some(node);
    }

    pub fn dequeue<N: BucketNode>(&mut self, nodes: &[N]) -> Option<usize> {
        while self.minimum < self.buckets.len() {
            if let Some(node) = self.buckets[self.minimum] {
                self.buckets[self.minimum] = nodes[node].next_with_same_priority();
                self.count -= 1;
                return Some(node);
            }
            self.minimum += 1;
        }
        None
    }

    /// Переносит узел из корзины `old_priority` в корзину его текущего приоритета.
    ///
    /// Узел обязан лежать в корзине `old_priority`; если его там нет, он просто
    /// добавляется в очередь.
    pub fn change_priority<N: BucketNode>(
        &mut self,
        nodes: &mut [N],
        node: usize,
        old_priority: usize,
    ) {
        let found = self.unlink(nodes, node, old_priority);
        debug_assert!(found, "node {node} is not queued at priority {old_priority}");
        if found {
            self.count -= 1;
        }
        self.enqueue(nodes, node);
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.count = 0;
        self.minimum = usize::MAX;
    }

    fn unlink<N: BucketNode>(&mut self, nodes: &mut [N], node: usize, priority: usize) -> bool {
        let Some(&Some(head)) = self.buckets.get(priority) else {
            return false;
        };
        if head == node {
            self.buckets[priority] = nodes[node].next_with_same_priority();
            return true;
        }

        let mut current = head;
        while let Some(next) = nodes[current].next_with_same_priority() {
            if next == node {
                let after = nodes[node].next_with_same_priority();
                nodes[current].set_next_with_same_priority(after);
                return true;
            }
            current = next;
        }
        false
    }
}
