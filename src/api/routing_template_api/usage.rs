use super::*;
use crate::domain::consumer::LineItemDraft;

/// 模板使用排行条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateUsageRank {
    pub template: RoutingTemplate,
    pub usage_count: i64,
}

impl RoutingTemplateApi {
    // ==========================================
    // 消费方应用接口
    // ==========================================

    /// 将模板应用到生产包
    ///
    /// # 说明
    /// - 未批准的模板允许应用 (由业务流程把关),仅告警
    /// - stamp_line_items = true 时同时为明细行写入首道工序
    ///
    /// # 返回
    /// - Ok(usize): 写入工序引用的明细行数
    /// - Err(NotFound): 模板或生产包不存在
    pub fn apply_to_consumer(
        &self,
        template_id: &str,
        package_id: &str,
        stamp_line_items: bool,
        actor: &str,
    ) -> ApiResult<usize> {
        let template = self.require_template(template_id)?;
        if !template.is_approved() {
            warn!(
                template_id = %template_id,
                status = %template.approval_status,
                package_id = %package_id,
                "应用未批准的模板"
            );
        }

        if !self
            .consumers
            .assign_template(package_id, template_id, Self::now())?
        {
            return Err(ApiError::NotFound(format!("生产包(id={})不存在", package_id)));
        }

        let stamped = if stamp_line_items {
            self.apply_to_line_items(package_id, template_id)?
        } else {
            0
        };

        self.record_action(
            template_id,
            TemplateActionType::ApplyToPackage,
            actor,
            Some(serde_json::json!({
                "package_id": package_id,
                "stamped_line_items": stamped,
            })),
            None,
        );
        Ok(stamped)
    }

    /// 为生产包的每个明细行写入模板首道有效工序; 返回写入行数
    pub fn apply_to_line_items(&self, package_id: &str, template_id: &str) -> ApiResult<usize> {
        let snapshot = self.require_snapshot(template_id)?;
        if self.consumers.find_package(package_id)?.is_none() {
            return Err(ApiError::NotFound(format!("生产包(id={})不存在", package_id)));
        }

        let Some(first) = snapshot.active_operations().next() else {
            debug!(template_id = %template_id, "模板无有效工序,明细行不变");
            return Ok(0);
        };

        let now = Self::now();
        let mut stamped = 0;
        for item in self.consumers.list_line_items(package_id)? {
            if self
                .consumers
                .set_line_item_operation(&item.line_item_id, &first.operation_id, now)?
            {
                stamped += 1;
            }
        }
        Ok(stamped)
    }

    /// 按有效工序生成明细草稿 (分钟 = 单件加工时间 × 60,截断取整)
    pub fn generate_line_items(
        &self,
        template_id: &str,
        quantity: i32,
    ) -> ApiResult<Vec<LineItemDraft>> {
        let snapshot = self.require_snapshot(template_id)?;
        Ok(snapshot
            .active_operations()
            .map(|op| LineItemDraft {
                routing_operation_id: op.operation_id.clone(),
                description: op.operation_name.clone(),
                quantity,
                minutes: (op.processing_time_per_unit * 60.0) as i64,
            })
            .collect())
    }

    // ==========================================
    // 使用统计
    // ==========================================

    /// 没有未删除的生产包引用时才可删除
    pub fn can_delete(&self, template_id: &str) -> ApiResult<bool> {
        Ok(self.consumers.count_references(template_id)? == 0)
    }

    pub fn usage_count(&self, template_id: &str) -> ApiResult<i64> {
        Ok(self.consumers.count_references(template_id)?)
    }

    pub fn last_used_date(&self, template_id: &str) -> ApiResult<Option<NaiveDateTime>> {
        Ok(self.consumers.last_used(template_id)?)
    }

    /// 最常用模板: 引用次数降序,同数按编码; top_n 缺省取配置值
    pub fn most_used(
        &self,
        org_id: &str,
        top_n: Option<usize>,
    ) -> ApiResult<Vec<TemplateUsageRank>> {
        let limit = top_n.unwrap_or(self.config.most_used_top_n);
        let counts: HashMap<String, i64> = self
            .consumers
            .usage_counts(org_id)?
            .into_iter()
            .map(|u| (u.template_id, u.usage_count))
            .collect();

        let mut ranks: Vec<TemplateUsageRank> = self
            .template_repo
            .list_by_org(org_id)?
            .into_iter()
            .filter_map(|t| {
                counts.get(&t.template_id).map(|count| TemplateUsageRank {
                    usage_count: *count,
                    template: t,
                })
            })
            .collect();

        ranks.sort_by(|a, b| {
            b.usage_count
                .cmp(&a.usage_count)
                .then_with(|| a.template.code.cmp(&b.template.code))
        });
        ranks.truncate(limit);
        Ok(ranks)
    }

    /// 组织内各模板类型的模板数
    pub fn usage_by_type(&self, org_id: &str) -> ApiResult<HashMap<TemplateType, usize>> {
        let mut by_type = HashMap::new();
        for t in self.template_repo.list_by_org(org_id)? {
            *by_type.entry(t.template_type).or_insert(0) += 1;
        }
        Ok(by_type)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 全文检索 (编码、名称、描述、产品类别、材质,不区分大小写),按名称排序
    pub fn search(&self, org_id: &str, term: &str) -> ApiResult<Vec<RoutingTemplate>> {
        let needle = term.trim().to_lowercase();
        self.list_sorted_by_name(org_id, |t| {
            if needle.is_empty() {
                return true;
            }
            [
                Some(t.code.as_str()),
                Some(t.name.as_str()),
                t.description.as_deref(),
                t.product_category.as_deref(),
                t.material_type.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
        })
    }

    /// 组合筛选,按名称排序
    pub fn filter(&self, org_id: &str, filter: &TemplateFilter) -> ApiResult<Vec<RoutingTemplate>> {
        self.list_sorted_by_name(org_id, |t| filter.matches(t))
    }
}
