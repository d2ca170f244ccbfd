use super::*;

impl RoutingTemplateApi {
    // ==========================================
    // 复制与版本接口
    // ==========================================

    /// 复制模板 (含全部工序),新模板为草稿、未启用
    ///
    /// # 返回
    /// - Err(NotFound): 源模板不存在
    /// - Err(DuplicateCode): 新编码在组织内已存在
    pub fn copy_template(
        &self,
        source_template_id: &str,
        new_code: &str,
        new_name: &str,
        actor: &str,
    ) -> ApiResult<TemplateSnapshot> {
        if new_code.trim().is_empty() || new_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("新模板编码与名称不能为空".to_string()));
        }
        let source = self.require_snapshot(source_template_id)?;
        self.ensure_code_available(&source.template.org_id, new_code, None)?;

        let mut copy = self
            .cloner
            .copy(&source, new_code, new_name, Some(actor), Self::now());
        copy.template.estimated_total_hours = self.calculator.total_hours(&copy, 1, None);
        self.template_repo.save_snapshot(&copy)?;

        self.record_action(
            &copy.template.template_id,
            TemplateActionType::Copy,
            actor,
            Some(serde_json::json!({
                "source_template_id": source_template_id,
                "source_code": source.template.code,
                "operation_count": copy.operations.len(),
            })),
            Some(format!("复制自 {}", source.template.code)),
        );
        Ok(copy)
    }

    /// 创建新版本: 编码 "{base}_v{tag}",版本号为 tag
    pub fn create_new_version(
        &self,
        source_template_id: &str,
        version_tag: &str,
        actor: &str,
    ) -> ApiResult<TemplateSnapshot> {
        if version_tag.trim().is_empty() {
            return Err(ApiError::InvalidInput("版本号不能为空".to_string()));
        }
        let source = self.require_snapshot(source_template_id)?;
        let code = TemplateCloner::version_code(&source.template.code, version_tag);
        self.ensure_code_available(&source.template.org_id, &code, None)?;

        let mut version = self
            .cloner
            .new_version(&source, version_tag, Some(actor), Self::now());
        version.template.estimated_total_hours = self.calculator.total_hours(&version, 1, None);
        self.template_repo.save_snapshot(&version)?;

        self.record_action(
            &version.template.template_id,
            TemplateActionType::CreateVersion,
            actor,
            Some(serde_json::json!({
                "source_template_id": source_template_id,
                "version": version_tag,
            })),
            None,
        );
        Ok(version)
    }

    /// 版本族: 编码等于 base_code 或以 "{base_code}_v" 开头
    pub fn list_versions(&self, org_id: &str, base_code: &str) -> ApiResult<Vec<RoutingTemplate>> {
        let templates = self.template_repo.list_by_org(org_id)?;
        Ok(TemplateCloner::list_versions(
            templates,
            base_code,
            self.config.version_ordering,
        ))
    }
}
